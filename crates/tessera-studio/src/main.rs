mod scenarios;

use anyhow::Result;
use tessera_gfx::logging::{init_logging, LoggingConfig};

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    println!();
    println!("  ╔════════════════════════════════════════╗");
    println!("  ║        TESSERA HEADLESS STUDIO         ║");
    println!("  ║   recording device  ·  no GPU needed   ║");
    println!("  ╚════════════════════════════════════════╝");
    println!();

    for scenario in scenarios::ALL {
        println!("  ── {} ──", scenario.name);
        let summary = (scenario.run)()?;
        for line in summary {
            println!("    {line}");
        }
        println!();
    }

    log::info!("all {} scenarios passed", scenarios::ALL.len());
    Ok(())
}
