use assert_cmd::prelude::*; // Add methods on commands
use predicates::prelude::*;
use std::path::Path;
use std::process::Command; // Run programs
use tempfile;
type STDRESULT = Result<(),Box<dyn std::error::Error>>;

const SAM: &str = "I am Sam. Sam I am. I do not like this Sam I am.\n";

// Compress `txt`, expand the result, and check we got `txt` back.
// Files are named after `tag`, which must be new in `temp_dir`, otherwise the overwrite prompt aborts.
// Returns the compressed bytes.
fn round_trip(txt: &[u8],kind: &str,tag: &str,temp_dir: &tempfile::TempDir) -> Result<Vec<u8>,Box<dyn std::error::Error>> {
    let in_path = temp_dir.path().join([tag,".original.",kind].concat());
    let cmp_path = temp_dir.path().join([tag,".compressed.",kind].concat());
    let out_path = temp_dir.path().join([tag,".expanded.",kind].concat());
    assert!(!cmp_path.exists() && !out_path.exists(),"tag {} was already used",tag);
    std::fs::write(&in_path,txt)?;
    Command::cargo_bin("huffpack")?
        .arg("compress")
        .arg("-s").arg(kind)
        .arg("-i").arg(&in_path)
        .arg("-o").arg(&cmp_path)
        .assert()
        .success()
        .stderr(predicate::str::contains("compressed"));
    Command::cargo_bin("huffpack")?
        .arg("expand")
        .arg("-s").arg(kind)
        .arg("-i").arg(&cmp_path)
        .arg("-o").arg(&out_path)
        .assert()
        .success();
    assert_eq!(std::fs::read(&out_path)?,txt.to_vec());
    Ok(std::fs::read(&cmp_path)?)
}

#[test]
fn byte_round_trip() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let compressed = round_trip(SAM.as_bytes(),"byte","sam",&temp_dir)?;
    assert_eq!(compressed[0..2],*b"HF");
    let binary: Vec<u8> = (0..=255u8).cycle().take(3000).collect();
    let compressed = round_trip(&binary,"byte","binary",&temp_dir)?;
    // every byte value occurs, so the descriptor alone is 256 leaves of 9 bits and 255 branch bits
    assert!(compressed.len() > 24 + (256*9 + 255)/8);
    Ok(())
}

#[test]
fn char_round_trip() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    round_trip("Ärger über Öl, ça va, 日本語のテキスト".as_bytes(),"char","mixed",&temp_dir)?;
    let compressed = round_trip("AAAA".as_bytes(),"char","single",&temp_dir)?;
    // header, one leaf of 22 bits, 4 payload bits
    assert_eq!(compressed.len(),24 + 3 + 1);
    Ok(())
}

#[test]
fn code_listing() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let in_path = temp_dir.path().join("input.txt");
    let cmp_path = temp_dir.path().join("encoded.huf");
    let codes_path = temp_dir.path().join("codes.txt");
    std::fs::write(&in_path,"AAABBCCA")?;
    Command::cargo_bin("huffpack")?
        .arg("compress")
        .arg("-s").arg("char")
        .arg("-i").arg(&in_path)
        .arg("-o").arg(&cmp_path)
        .arg("-c").arg(&codes_path)
        .assert()
        .success();
    assert_eq!(std::fs::read_to_string(&codes_path)?,"A:0\nB:10\nC:11\n");
    Command::cargo_bin("huffpack")?
        .arg("codes")
        .arg("-s").arg("char")
        .arg("-i").arg(&cmp_path)
        .assert()
        .success()
        .stdout("A:0\nB:10\nC:11\n");
    Ok(())
}

#[test]
fn empty_input_fails() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let in_path = temp_dir.path().join("empty.txt");
    let out_path = temp_dir.path().join("empty.huf");
    std::fs::write(&in_path,"")?;
    Command::cargo_bin("huffpack")?
        .arg("compress")
        .arg("-i").arg(&in_path)
        .arg("-o").arg(&out_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("EmptyInput"));
    Ok(())
}

#[test]
fn corrupt_container_fails() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let compressed = round_trip(SAM.as_bytes(),"byte","sam",&temp_dir)?;
    let bad_path = temp_dir.path().join("truncated.huf");
    let out_path = temp_dir.path().join("truncated.txt");
    std::fs::write(&bad_path,&compressed[0..compressed.len()-1])?;
    Command::cargo_bin("huffpack")?
        .arg("expand")
        .arg("-i").arg(&bad_path)
        .arg("-o").arg(&out_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("CorruptContainer"));
    assert!(!Path::new(&out_path).exists() || std::fs::read(&out_path)?.is_empty());
    Ok(())
}

#[test]
fn wrong_symbol_kind_fails() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let compressed = round_trip(SAM.as_bytes(),"byte","sam",&temp_dir)?;
    let cmp_path = temp_dir.path().join("sam.huf");
    std::fs::write(&cmp_path,&compressed)?;
    Command::cargo_bin("huffpack")?
        .arg("codes")
        .arg("-s").arg("char")
        .arg("-i").arg(&cmp_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("FileFormatMismatch"));
    Ok(())
}
