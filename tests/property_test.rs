use proptest::prelude::*;
use huffpack::{compress,decompress,huff};

// geometric distribution over a small alphabet, mostly 0, rarely 20 or more
fn skewed_bytes() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u32>().prop_map(|r| r.trailing_zeros() as u8),1..3000)
}

// a few symbols with very different counts
fn lopsided_chars() -> impl Strategy<Value = Vec<char>> {
    (1usize..2000,0usize..40,0usize..3).prop_map(|(a,b,c)| {
        let mut ans = vec!['a';a];
        ans.extend(std::iter::repeat('ß').take(b));
        ans.extend(std::iter::repeat('語').take(c));
        ans.rotate_left(a/2);
        ans
    })
}

proptest! {
    #[test]
    fn any_bytes_round_trip(data in prop::collection::vec(any::<u8>(),1..2000)) {
        let (compressed,stats) = compress(&data).expect("compression failed");
        prop_assert_eq!(stats.original_count,data.len());
        // never worse than a fixed 8 bit code
        prop_assert!(stats.encoded_bit_length <= 8*data.len() as u64);
        prop_assert_eq!(decompress::<u8>(&compressed).expect("expansion failed"),data);
    }

    #[test]
    fn small_alphabet_round_trip(alphabet in 1u8..=16,picks in prop::collection::vec(any::<u8>(),1..2000)) {
        let data: Vec<u8> = picks.iter().map(|p| b'a' + p % alphabet).collect();
        let (compressed,stats) = compress(&data).expect("compression failed");
        prop_assert!(stats.encoded_bit_length >= data.len() as u64);
        prop_assert_eq!(decompress::<u8>(&compressed).expect("expansion failed"),data.clone());
        // one listing line per distinct symbol
        let distinct = data.iter().collect::<std::collections::BTreeSet<_>>().len();
        prop_assert_eq!(huff::code_listing::<u8>(&compressed).expect("listing failed").lines().count(),distinct);
    }

    #[test]
    fn skewed_bytes_round_trip(data in skewed_bytes()) {
        let (first,_) = compress(&data).expect("compression failed");
        let (second,_) = compress(&data).expect("compression failed");
        prop_assert_eq!(&first,&second);
        prop_assert_eq!(decompress::<u8>(&first).expect("expansion failed"),data);
    }

    #[test]
    fn any_chars_round_trip(data in prop::collection::vec(any::<char>(),1..500)) {
        let (compressed,_) = compress(&data).expect("compression failed");
        prop_assert_eq!(decompress::<char>(&compressed).expect("expansion failed"),data);
    }

    #[test]
    fn lopsided_chars_round_trip(data in lopsided_chars()) {
        let (compressed,stats) = compress(&data).expect("compression failed");
        prop_assert_eq!(decompress::<char>(&compressed).expect("expansion failed"),data.clone());
        // no worse than giving `a` the one bit code
        let a_count = data.iter().filter(|c| **c == 'a').count() as u64;
        prop_assert!(stats.encoded_bit_length <= 2*data.len() as u64 - a_count);
    }
}
