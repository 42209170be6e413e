use std::path::Path;
use std::process::ExitCode;

use autoterm::glossary::Glossary;

fn main() -> ExitCode {
    env_logger::init();

    let glossary = match std::env::args().nth(1) {
        Some(path) => {
            println!("Checking glossary file {}...", path);
            Glossary::load(Path::new(&path))
        }
        None => {
            println!("Checking bundled glossary...");
            Glossary::builtin()
        }
    };

    let glossary = match glossary {
        Ok(glossary) => glossary,
        Err(e) => {
            eprintln!("Glossary is invalid: {}", e);
            return ExitCode::FAILURE;
        }
    };

    println!("\nTerms per category:");
    for category in glossary.categories() {
        println!(
            "  {:<24} {:>4}  ({})",
            category.display_name(),
            glossary.by_category(category).len(),
            category.id()
        );
    }
    println!("\nTotal: {} terms in {} categories", glossary.len(), glossary.categories().len());

    ExitCode::SUCCESS
}
