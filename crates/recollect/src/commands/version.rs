fn version_text() -> String {
    format!(
        "recollect {}\nProject memory extracted from AI assistant transcripts",
        env!("CARGO_PKG_VERSION")
    )
}

pub fn run() -> anyhow::Result<()> {
    println!("{}", version_text());
    Ok(())
}
