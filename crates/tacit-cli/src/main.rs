use std::{env, fs, process::ExitCode};

use tacit::{InputPort, Interpreter, InterpretError, Program, QueuedInput, StdErrOutput, StdInput, StdOutput};

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();

    match args.get(1).map(String::as_str) {
        Some("--help" | "-h") => {
            usage();
            ExitCode::SUCCESS
        }
        Some(program_path) => run_program(program_path, args.get(2).map(String::as_str)),
        None => {
            usage();
            ExitCode::FAILURE
        }
    }
}

fn usage() {
    eprintln!("usage: tacit <program.xml> [input.txt]");
    eprintln!();
    eprintln!("Runs the XML-delivered program. READ consumes lines from input.txt");
    eprintln!("when given, otherwise from stdin. The process exits with the");
    eprintln!("program's exit code, or with the error's code on failure.");
}

fn run_program(program_path: &str, input_path: Option<&str>) -> ExitCode {
    let source = match fs::read_to_string(program_path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("error reading {program_path}: {err}");
            return ExitCode::FAILURE;
        }
    };

    let program = match Program::parse(&source) {
        Ok(program) => program,
        Err(err) => return report(&err),
    };

    let result = match input_path {
        Some(path) => match fs::read_to_string(path) {
            Ok(text) => interpret(&program, &mut QueuedInput::from_text(&text)),
            Err(err) => {
                eprintln!("error reading {path}: {err}");
                return ExitCode::FAILURE;
            }
        },
        None => interpret(&program, &mut StdInput),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(err) => report(&err),
    }
}

fn interpret(program: &Program, input: &mut dyn InputPort) -> Result<u8, InterpretError> {
    let mut output = StdOutput;
    let mut errput = StdErrOutput;
    Interpreter::new(program, input, &mut output, &mut errput).run()
}

fn report(err: &InterpretError) -> ExitCode {
    eprintln!("{err}");
    ExitCode::from(err.exit_code())
}
