//! Aster compiler CLI entry point.
//!
//! Usage:
//!   asterc lex <input.as>      (dump tokens)
//!   asterc parse <input.as>    (dump AST)
//!   asterc resolve <input.as>  (resolve and print typed declarations)

use aster_compiler::errors::{CompileError, Diagnostic};
use aster_compiler::intern::Interner;
use aster_compiler::lexer::Lexer;
use aster_compiler::parser::Parser;
use aster_compiler::resolver;
use aster_compiler::token::TokenKind;
use std::{env, fs, process};

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 3 {
        eprintln!("Usage: asterc <command> <file.as>");
        eprintln!("Commands: lex, parse, resolve");
        process::exit(64);
    }

    let command = &args[1];
    let filename = &args[2];

    let source = match fs::read_to_string(filename) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading '{}': {}", filename, e);
            process::exit(74);
        }
    };

    match command.as_str() {
        "lex" => {
            let mut interner = Interner::new();
            let mut lexer = Lexer::new(&source, &mut interner);
            loop {
                let token = lexer.next_token();
                println!("{:?}", token);
                if token.kind == TokenKind::Eof {
                    break;
                }
            }
            let errors = lexer.take_errors();
            report(&errors, &source);
            if !errors.is_empty() {
                process::exit(65);
            }
        }
        "parse" => {
            let mut interner = Interner::new();
            let (module, errors) = Parser::new(&source, &mut interner).parse();
            for decl in &module.decls {
                println!("{:#?}", decl);
            }
            report(&errors, &source);
            if !errors.is_empty() {
                process::exit(65);
            }
        }
        "resolve" => {
            let mut interner = Interner::new();
            let (module, parse_errors) = Parser::new(&source, &mut interner).parse();
            report(&parse_errors, &source);
            if !parse_errors.is_empty() {
                process::exit(65);
            }

            let (resolved, errors) = resolver::resolve(&module, &mut interner);
            for function in &resolved.functions {
                println!(
                    "{} : {}",
                    interner.resolve(function.name),
                    resolved.types.display(function.ty, &interner)
                );
            }
            for foreign in &resolved.foreigns {
                println!(
                    "foreign {} : {}",
                    interner.resolve(foreign.local_name),
                    resolved.types.display(foreign.ty, &interner)
                );
            }
            report(&errors, &source);
            if !errors.is_empty() {
                process::exit(65);
            }
        }
        _ => {
            eprintln!("Unknown command: {}", command);
            process::exit(64);
        }
    }
}

/// Render diagnostics with source context.
fn report(errors: &[Diagnostic], source: &str) {
    for diag in errors {
        let error = CompileError::from_diagnostic(diag, source);
        eprintln!("{:?}", miette::Report::new(error));
    }
}
