//! Interactive shell over one [`Engine`]: a `reedline` line editor, a
//! handful of `:`-prefixed commands, everything else treated as a
//! graph-pattern query.

use dlrete_engine::Engine;
use reedline::{DefaultPrompt, Reedline, Signal};

use crate::{ontology, table};

pub fn run(engine: &mut Engine) {
    let mut line_editor = Reedline::create();
    let prompt = DefaultPrompt::default();

    println!("dlrete reasoner — type :help for commands, :quit to exit.");

    loop {
        match line_editor.read_line(&prompt) {
            Ok(Signal::Success(buffer)) => {
                let input = buffer.trim();
                if input.is_empty() {
                    continue;
                }
                if !dispatch(engine, input) {
                    break;
                }
            }
            Ok(Signal::CtrlD) | Ok(Signal::CtrlC) => {
                println!("Aborting.");
                break;
            }
            Err(err) => {
                eprintln!("Error: {:?}", err);
                break;
            }
        }
    }
}

/// Returns `false` when the REPL should exit.
fn dispatch(engine: &mut Engine, input: &str) -> bool {
    match input {
        ":quit" | ":q" => return false,
        ":help" => {
            println!(":assert <line>   add one ontology-format fact");
            println!(":stats           print node-sharing / propagation metrics");
            println!(":save <path>     write a snapshot");
            println!(":load <path>     replace the network with a snapshot");
            println!("anything else is run as a SELECT/DESCRIBE query");
            return true;
        }
        _ => {}
    }

    if let Some(rest) = input.strip_prefix(":assert ") {
        let (records, errors) = ontology::load_facts(engine.symbols(), rest);
        for (line, message) in &errors {
            eprintln!("[!] line {line}: {message}");
        }
        if let Err(e) = engine.add_facts_batch(records) {
            eprintln!("[!] {e}");
        }
        return true;
    }
    if let Some(path) = input.strip_prefix(":save ") {
        match engine.save(std::path::Path::new(path.trim())) {
            Ok(()) => println!("saved to {path}"),
            Err(e) => eprintln!("[!] {e}"),
        }
        return true;
    }
    if let Some(path) = input.strip_prefix(":load ") {
        match Engine::load(std::path::Path::new(path.trim()), engine.config().clone()) {
            Ok(loaded) => {
                *engine = loaded;
                println!("loaded {path}");
            }
            Err(e) => eprintln!("[!] {e}"),
        }
        return true;
    }
    if input == ":stats" {
        engine.print_metrics();
        println!("{:#?}", engine.get_metrics());
        return true;
    }

    match engine.query(input, 0) {
        Ok(result) => table::print_result(engine.symbols(), &result),
        Err(e) => eprintln!("[!] {e}"),
    }
    true
}
