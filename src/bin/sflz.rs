use clap::{crate_version, App, Arg, ArgMatches, SubCommand};
use console::style;
use dialoguer::{theme::ColorfulTheme, Select};
use indicatif::{ProgressBar, ProgressStyle};
use sflz::{
    ar::{ArResult, Store},
    compress::{lz77::Lz77, Pipeline},
};
use std::path::{Path, PathBuf};

/// Options shared by both modes, every one of them has a default
struct Opts {
    /// Text file to compress, `None` for the store's own input file
    input: Option<PathBuf>,
    /// Directory holding the artifacts
    dir: PathBuf,
    /// LZ77 window size
    window: usize,
    /// Hide the progress spinner and summary
    quiet: bool,
}

impl Opts {
    /// Read options from any level of the parsed arguments, falling back to defaults for ones that
    /// are missing
    fn from_matches(args: &ArgMatches) -> Self {
        Self {
            input: args.value_of("input").map(PathBuf::from),
            dir: PathBuf::from(args.value_of("dir").unwrap_or(".")),
            window: args
                .value_of("window")
                .and_then(|s| s.parse().ok())
                .unwrap_or(Lz77::DEFAULT_WINDOW),
            quiet: args.is_present("quiet"),
        }
    }
}

fn dir_arg() -> Arg<'static, 'static> {
    Arg::with_name("dir")
        .takes_value(true)
        .multiple(false)
        .long("dir")
        .short("d")
        .help("Directory that the artifacts are written to and read from")
        .validator(|s| match Path::new(&s).is_dir() {
            true => Ok(()),
            false => Err(format!("The artifact directory at {} does not exist", s)),
        })
}

/// Create the `encode` subcommand
fn encode_subcommand() -> App<'static, 'static> {
    SubCommand::with_name("encode")
        .about("Compress a text file into Shannon-Fano and LZ77 artifacts")
        .alias("e")
        .arg(Arg::with_name("input")
            .takes_value(true)
            .multiple(false)
            .long("input")
            .short("i")
            .help("Path to the text file to compress, input.txt in the artifact directory if not given")
            .validator(|s| match Path::new(&s).exists() {
                true => Ok(()),
                false => Err(format!("The input file at {} does not exist", s)),
            })
        )
        .arg(dir_arg())
        .arg(Arg::with_name("window")
            .takes_value(true)
            .multiple(false)
            .long("window")
            .short("w")
            .help("How many characters back the LZ77 stage searches for matches")
            .validator(|s| match s.parse::<usize>() {
                Ok(_) => Ok(()),
                Err(_) => Err(format!("The window size {} is not a whole number", s)),
            })
        )
}

/// Create the `decode` subcommand
fn decode_subcommand() -> App<'static, 'static> {
    SubCommand::with_name("decode")
        .about("Restore the original text from the artifacts of an earlier encode")
        .alias("d")
        .arg(dir_arg())
}

fn main() {
    let app = App::new("sflz")
        .about("Compress text with Shannon-Fano coding followed by LZ77, or restore it. Asks which to do when no subcommand is given")
        .version(crate_version!())
        .arg(Arg::with_name("quiet")
            .long("quiet")
            .short("q")
            .global(true)
            .help("Don't show progress or a summary when finished")
        )
        .subcommand(encode_subcommand())
        .subcommand(decode_subcommand());
    let matches = app.get_matches();

    let res = match matches.subcommand() {
        ("encode", Some(args)) => encode(&Opts::from_matches(args)),
        ("decode", Some(args)) => decode(&Opts::from_matches(args)),
        _ => select_mode(&Opts::from_matches(&matches)),
    };

    if let Err(e) = res {
        eprintln!("{} {}", style("error:").red().bold(), e);
        std::process::exit(1);
    }
}

/// Ask which way to run the pipeline
fn select_mode(opts: &Opts) -> ArResult<()> {
    let mode = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("What should be done?")
        .items(&["Encode", "Decode"])
        .default(0)
        .interact()?;

    match mode {
        0 => encode(opts),
        _ => decode(opts),
    }
}

/// Create a spinner that shows which stage is running
fn spinner(quiet: bool) -> ProgressBar {
    match quiet {
        true => ProgressBar::hidden(),
        false => {
            let prog = ProgressBar::new_spinner().with_style(
                ProgressStyle::default_spinner()
                    .tick_chars(".,'`*@*`',")
                    .template("{spinner} {msg}"),
            );
            prog.enable_steady_tick(80);
            prog
        }
    }
}

/// Compress the input file and write the artifacts
fn encode(opts: &Opts) -> ArResult<()> {
    let store = Store::new(&opts.dir);
    let prog = spinner(opts.quiet);

    prog.set_message("Reading input");
    let text = store.read_input(opts.input.as_deref())?;

    prog.set_message(format!("Compressing {} characters", text.chars().count()));
    let compressed = Pipeline::new(opts.window).compress(&text)?;

    prog.set_message(format!("Writing artifacts to {}", store.dir().display()));
    store.save_encoded(&compressed)?;
    prog.finish_and_clear();

    if !opts.quiet {
        println!(
            "{} {} distinct symbols, {} bits, {} token stream characters",
            style("Done").green().bold(),
            compressed.table.len(),
            compressed.bits.len(),
            compressed.tokens.chars().count(),
        );
    }
    Ok(())
}

/// Restore the original text from the artifacts
fn decode(opts: &Opts) -> ArResult<()> {
    let store = Store::new(&opts.dir);
    let prog = spinner(opts.quiet);

    prog.set_message(format!("Reading artifacts from {}", store.dir().display()));
    let (tokens, table) = store.load_encoded()?;

    prog.set_message("Decompressing");
    let decompressed = Pipeline::default().decompress(&tokens, &table)?;

    prog.set_message(format!("Writing {}", Store::OUTPUT_FILE));
    store.save_decoded(&tokens, &decompressed)?;
    prog.finish_and_clear();

    if decompressed.trailing > 0 {
        eprintln!(
            "{} {} bits at the end of the bitstring matched no code and were discarded",
            style("warning:").yellow().bold(),
            decompressed.trailing,
        );
    }
    if !opts.quiet {
        println!(
            "{} {} bits restored to {} characters",
            style("Done").green().bold(),
            decompressed.bits.len(),
            decompressed.text.chars().count(),
        );
    }
    Ok(())
}
