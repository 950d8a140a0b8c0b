use clap::{arg,crate_version,Command};
use huffpack::{huff,SymbolKind,Options,STD_OPTIONS};
type STDRESULT = Result<(),Box<dyn std::error::Error>>;

const RCH: &str = "unreachable was reached";

fn ok_to_overwrite(path_out: &str) -> bool {
    if let Ok(_f) = std::fs::File::open(path_out) {
        let mut ans = String::new();
        eprint!("{} exists, overwrite? (y/n) ",path_out);
        std::io::stdin().read_line(&mut ans).expect("could not read stdin");
        if ans.trim_end()=="y" || ans.trim_end()=="Y" {
            return true;
        }
        return false;
    }
    true
}

fn options(cmd: &clap::ArgMatches) -> Options {
    let mut opt = STD_OPTIONS;
    if cmd.get_one::<String>("symbols").map(|s| s.as_str()) == Some("char") {
        opt.symbols = SymbolKind::Char;
    }
    opt
}

fn main() -> STDRESULT
{
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let long_help =
"Examples:
---------
Compress:      `huffpack compress -i my_expanded -o my_compressed`
Expand:        `huffpack expand -i my_compressed -o my_expanded`
Text:          `huffpack compress -s char -i notes.txt -o notes.huf -c notes.codes`
Show codes:    `huffpack codes -s char -i notes.huf`";

    let kinds = ["byte","char"];

    let mut main_cmd = Command::new("huffpack")
        .about("Compress and expand with static Huffman codes")
        .after_long_help(long_help)
        .version(crate_version!());
    main_cmd = main_cmd.subcommand(Command::new("compress")
        .arg(arg!(-s --symbols <KIND> "symbol kind").value_parser(kinds)
            .required(false).default_value("byte"))
        .arg(arg!(-i --input <PATH> "input path").required(true))
        .arg(arg!(-o --output <PATH> "output path").required(true))
        .arg(arg!(-c --codes <PATH> "also write the code listing here").required(false))
        .about("compress a file"));

    main_cmd = main_cmd.subcommand(Command::new("expand")
        .arg(arg!(-s --symbols <KIND> "symbol kind").value_parser(kinds)
            .required(false).default_value("byte"))
        .arg(arg!(-i --input <PATH> "input path").required(true))
        .arg(arg!(-o --output <PATH> "output path").required(true))
        .about("expand a file"));

    main_cmd = main_cmd.subcommand(Command::new("codes")
        .arg(arg!(-s --symbols <KIND> "symbol kind").value_parser(kinds)
            .required(false).default_value("byte"))
        .arg(arg!(-i --input <PATH> "compressed file").required(true))
        .about("print the code of each symbol in a compressed file"));

    let matches = main_cmd.get_matches();

    if let Some(cmd) = matches.subcommand_matches("compress") {
        let path_in = cmd.get_one::<String>("input").expect(RCH);
        let path_out = cmd.get_one::<String>("output").expect(RCH);
        let opt = options(cmd);
        if !ok_to_overwrite(path_out) {
            eprintln!("abort operation");
            return Ok(());
        }
        let mut in_file = std::fs::File::open(path_in)?;
        let mut out_file = std::fs::OpenOptions::new().write(true).truncate(false).create(true).open(path_out)?;
        let (in_size,out_size) = huff::compress_file(&mut in_file,&mut out_file,&opt)?;
        out_file.set_len(out_size)?;
        if let Some(path_codes) = cmd.get_one::<String>("codes") {
            let container = std::fs::read(path_out)?;
            let listing = match opt.symbols {
                SymbolKind::Byte => huff::code_listing::<u8>(&container)?,
                SymbolKind::Char => huff::code_listing::<char>(&container)?
            };
            std::fs::write(path_codes,listing)?;
        }
        eprintln!("compressed {} into {}",in_size,out_size);
    }

    if let Some(cmd) = matches.subcommand_matches("expand") {
        let path_in = cmd.get_one::<String>("input").expect(RCH);
        let path_out = cmd.get_one::<String>("output").expect(RCH);
        let opt = options(cmd);
        if !ok_to_overwrite(path_out) {
            eprintln!("abort operation");
            return Ok(());
        }
        let mut in_file = std::fs::File::open(path_in)?;
        let mut out_file = std::fs::OpenOptions::new().write(true).truncate(false).create(true).open(path_out)?;
        let (in_size,out_size) = huff::expand_file(&mut in_file,&mut out_file,&opt)?;
        out_file.set_len(out_size)?;
        eprintln!("expanded {} into {}",in_size,out_size);
    }

    if let Some(cmd) = matches.subcommand_matches("codes") {
        let path_in = cmd.get_one::<String>("input").expect(RCH);
        let container = std::fs::read(path_in)?;
        let listing = match options(cmd).symbols {
            SymbolKind::Byte => huff::code_listing::<u8>(&container)?,
            SymbolKind::Char => huff::code_listing::<char>(&container)?
        };
        print!("{}",listing);
    }

    Ok(())
}
