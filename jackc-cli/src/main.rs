//! Entrypoint for CLI
use std::{
    env,
    error::Error,
    fs,
    io::BufWriter,
    path::{Path, PathBuf},
    time::Instant,
};

use jackc::{prelude::*, IMPL_VERSION};
use log::{error, info};

static USAGE: &str = r#"
usage: jackc FILE [options]

Compiles one class source file into stack machine code. The output is
written next to the source, with the extension replaced by .vm

options:
    -o OUT      Write the output to OUT instead
    --strict    Reject names declared twice in the same scope
    --no-fold   Always jump to the end of the subroutine on return

examples:
    jackc Main.jack
    jackc Square.jack -o build/Square.vm
"#;

struct Args {
    filepath: PathBuf,
    output: Option<PathBuf>,
    conf: CompilerConf,
}

fn run_compiler(args: &Args) -> JackResult<()> {
    let output = match &args.output {
        Some(output) => output.clone(),
        None => args.filepath.with_extension("vm"),
    };
    info!("compiling {}", args.filepath.display());

    let file_bytes = fs::read(&args.filepath)?;
    let source_code = String::from_utf8(file_bytes)?;

    let start = Instant::now();
    let lexer = Lexer::new(source_code.as_str());
    let writer = CompilationEngine::new(lexer, args.conf.clone()).compile_class()?;
    let end = Instant::now();

    // Output file is only created once the whole class compiled.
    let outfile = fs::File::create(&output)?;
    writer.write_to(BufWriter::new(outfile))?;

    info!(
        "wrote {} commands to {} in {}ms",
        writer.commands().len(),
        output.display(),
        end.duration_since(start).as_nanos() as f64 / 1000000.0
    );

    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    simple_logger::SimpleLogger::new().env().init()?;

    let args = match parse_args(env::args().skip(1)) {
        Some(args) => args,
        None => {
            print_usage();
            // FreeBSD EX_USAGE (64)
            std::process::exit(64)
        }
    };

    if let Err(err) = run_compiler(&args) {
        error!("{}: compilation failed\n{err}", args.filepath.display());
        std::process::exit(1)
    }

    Ok(())
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Option<Args> {
    let mut filepath = None;
    let mut output = None;
    let mut conf = CompilerConf::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-o" => output = Some(PathBuf::from(consume_arg(&mut args)?)),
            "--strict" => conf.strict_declarations = true,
            "--no-fold" => conf.fold_tail_return = false,
            _ if arg.starts_with('-') => return None,
            _ => {
                // Only one source file per invocation.
                if filepath.is_some() {
                    return None;
                }
                filepath = Some(Path::new(&arg).to_path_buf());
            }
        }
    }

    Some(Args {
        filepath: filepath?,
        output,
        conf,
    })
}

/// Consumes the value of an option.
fn consume_arg(args: &mut impl Iterator<Item = String>) -> Option<String> {
    args.next()
}

fn print_usage() {
    println!("jackc v{IMPL_VERSION}");
    println!("{USAGE}");
}

#[cfg(test)]
mod test {
    use super::*;

    fn args(line: &str) -> Option<Args> {
        parse_args(line.split_whitespace().map(String::from))
    }

    #[test]
    fn test_parse_args() {
        let parsed = args("Main.jack").unwrap();
        assert_eq!(parsed.filepath, Path::new("Main.jack"));
        assert!(parsed.output.is_none());
        assert!(!parsed.conf.strict_declarations);
        assert!(parsed.conf.fold_tail_return);

        let parsed = args("--strict Main.jack -o out/Main.vm --no-fold").unwrap();
        assert_eq!(parsed.output.as_deref(), Some(Path::new("out/Main.vm")));
        assert!(parsed.conf.strict_declarations);
        assert!(!parsed.conf.fold_tail_return);
    }

    #[test]
    fn test_bad_args() {
        assert!(args("").is_none());
        assert!(args("--strict").is_none());
        assert!(args("Main.jack -o").is_none());
        assert!(args("Main.jack Other.jack").is_none());
        assert!(args("Main.jack --verbose").is_none());
    }
}
