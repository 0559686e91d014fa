use colored::Colorize;

pub fn handle_error(err: anyhow::Error) -> ! {
    eprintln!("{} {:#}", "Error:".red().bold(), err);

    let msg = format!("{err:#}").to_lowercase();

    if msg.contains("no publish endpoint") {
        eprintln!("\n{}", "Suggestion:".yellow().bold());
        eprintln!("  Pass an endpoint or set it in the environment:");
        eprintln!(
            "  {} apiflow publish flow.json --endpoint https://api.pinata.cloud/pinning/pinJSONToIPFS",
            "$".dimmed()
        );
        eprintln!("  {} export APIFLOW_PUBLISH_URL=<url>", "$".dimmed());
    }

    if msg.contains("missing required field") || msg.contains("must be a json object") {
        eprintln!("\n{}", "Suggestion:".yellow().bold());
        eprintln!("  A snapshot needs both \"nodes\" and \"edges\". Create one with:");
        eprintln!("  {} apiflow init flow.json", "$".dimmed());
    }

    if msg.contains("dangling") || msg.contains("unknown node") {
        eprintln!("\n{}", "Suggestion:".yellow().bold());
        eprintln!("  Inspect the flow without --strict:");
        eprintln!("  {} apiflow validate <snapshot>", "$".dimmed());
    }

    if msg.contains("connection refused") || msg.contains("network") {
        eprintln!("\n{}", "Suggestion:".yellow().bold());
        eprintln!("  Check your internet connection and try again.");
    }

    std::process::exit(1);
}
