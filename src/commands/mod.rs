// Commands module - handles CLI command execution

use anyhow::Result;

pub mod replay;

pub use replay::handle_replay;

/// Print a shell completion script
pub fn handle_completion(shell_type: &str) -> Result<()> {
    use clap::CommandFactory;
    use clap_complete::{Shell, generate};

    let shell = match shell_type.to_lowercase().as_str() {
        "bash" => Shell::Bash,
        "zsh" => Shell::Zsh,
        "fish" => Shell::Fish,
        "elvish" => Shell::Elvish,
        "powershell" => Shell::PowerShell,
        _ => {
            anyhow::bail!(
                "Unsupported shell: {}. Supported: bash, zsh, fish, elvish, powershell",
                shell_type
            );
        }
    };

    let mut cmd = crate::cli::Cli::command();
    let name = cmd.get_name().to_string();
    let mut stdout = std::io::stdout();

    generate(shell, &mut cmd, name, &mut stdout);

    Ok(())
}

/// Write a default configuration file
pub fn handle_init_config(path: &std::path::Path) -> Result<()> {
    use anyhow::Context;

    let content = crate::config::Config::default().to_toml();
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write configuration file: {}", path.display()))?;
    println!("Configuration file created: {}", path.display());
    Ok(())
}
