use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use clap_complete::{generate, Shell};
use clap_mangen::Man;
use holdtime::cli::Args;

use std::io::Write;
use std::{
    env, fs,
    path::{Path, PathBuf},
    process::Command,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct XtaskArgs {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Generate man page and shell completions into docs/.
    GenerateDocs,
    /// Run cargo check.
    Check,
    /// Run cargo test.
    Test,
    /// Run cargo clippy.
    Clippy,
    /// Run cargo fmt --check.
    FmtCheck,
    /// Run the analysis benchmarks.
    Bench,
}

fn main() -> Result<()> {
    let args = XtaskArgs::parse();

    match args.command {
        Commands::GenerateDocs => generate_docs().context("Failed to generate docs"),
        Commands::Check => run_cargo("check", &["--all-targets"]).context("cargo check failed"),
        Commands::Test => run_cargo("test", &[]).context("cargo test failed"),
        Commands::Clippy => run_cargo("clippy", &["--all-targets", "--", "-D", "warnings"])
            .context("cargo clippy failed"),
        Commands::FmtCheck => run_cargo("fmt", &["--", "--check"]).context("cargo fmt failed"),
        Commands::Bench => run_cargo("bench", &["--bench", "analysis"]).context("cargo bench failed"),
    }
}

fn run_cargo(command: &str, args: &[&str]) -> Result<()> {
    let cargo = env::var("CARGO").unwrap_or_else(|_| "cargo".to_string());
    let status = Command::new(cargo)
        .arg(command)
        .args(args)
        .current_dir(project_root())
        .status()
        .with_context(|| format!("Failed to execute cargo {command}"))?;

    if !status.success() {
        anyhow::bail!("cargo {command} exited with {status}");
    }
    Ok(())
}

fn project_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .unwrap_or(manifest_dir)
        .to_path_buf()
}

fn generate_docs() -> Result<()> {
    let docs_dir = project_root().join("docs");
    let man_dir = docs_dir.join("man");
    let completions_dir = docs_dir.join("completions");

    fs::create_dir_all(&man_dir).context("Failed to create man directory")?;
    fs::create_dir_all(&completions_dir).context("Failed to create completions directory")?;

    let cmd = Args::command().name("holdtime");

    let man_path = man_dir.join("holdtime.1");
    println!("Generating man page: {man_path:?}");
    generate_man_page(&cmd, &man_path)?;

    generate_completions(&cmd, &completions_dir)?;

    println!(
        "Successfully generated man page and completions in: {}",
        docs_dir.display()
    );
    Ok(())
}

// --- Man Page Content Constants ---
// roff: \fB...\fR = bold, \fI...\fR = italic, \- = hyphen, \(bu = bullet

const MAN_HOLD_TIMES: &str = r#"
\fB{bin_name}\fR reads osu! replay files (\fI.osr\fR) and measures, for each logical key, how long every press was held down.
.PP
A replay stores one frame per input poll: a time delta, the cursor position and a bitmask of the physical inputs held at that moment (M1=1, M2=2, K1=4, K2=8, Smoke=16).
A logical key is a set of physical inputs; it counts as pressed on a frame when \fIany\fR of its inputs is held.
By default \fBKey 1\fR is \fBK1,M1\fR and \fBKey 2\fR is \fBK2,M2\fR, so a keyboard press and a mouse click on the same side are treated alike.
.PP
A hold starts on the first pressed frame after a released one and ends on the next released frame. Its duration is the difference of the two frame offsets in milliseconds.
Frames that repeat the current state are ignored. A press still held when the replay ends is discarded.
"#;

const MAN_STATISTIC: &str = r#"
Durations longer than \fB\-\-max\-hold\fR (inclusive bound, default 100ms) are dropped as outliers before anything is summarized; the number dropped is still reported.
.PP
Each key is summarized by a weighted mean in which every distinct duration \fId\fR seen \fIc\fR times contributes with weight \fIc\fR squared:
.PP
.RS 4
eavg = sum(d * c^2) / sum(c^2)
.RE
.PP
Durations that occur often dominate the value, so a few stray long presses barely move it.
A key with no kept holds has no statistic and is shown as \fBn/a\fR.
"#;

const MAN_OUTPUT: &str = r#"
One file is written per replay into \fB\-\-output\-dir\fR, named after the replay file:
.TP
.B svg
An overlaid bar chart of the kept durations per key, with a vertical line at each key's weighted mean.
The title shows the online score id (or \fBOffline\fR), the player, the UTC play date, the mods and the replay length.
.TP
.B json
The same data as a JSON document: title, replay metadata, legend lines and the per-key histograms and statistics.
.PP
A replay with no kept holds on any key is skipped and produces no file.
A replay that cannot be read or written produces \fIerror_<name>.txt\fR containing the error and its causes; the other replays are still processed.
"#;

const MAN_EXAMPLES: &str = r#"
.PP
Analyze everything in ./replays and write SVG charts to ./output:
.IP
.nf
\fB{bin_name}\fR
.fi
.PP
Analyze two files, keep holds up to 150ms, write JSON:
.IP
.nf
\fB{bin_name}\fR \-\-max\-hold 150ms \-\-format json a.osr b.osr
.fi
.PP
Keyboard-only players: bind each key to its keyboard input alone:
.IP
.nf
\fB{bin_name}\fR \-\-key1 K1 \-\-key2 K2 replays/
.fi
.PP
Debug logging as JSON lines:
.IP
.nf
\fB{bin_name}\fR \-\-verbose \-\-log\-format json
.fi
"#;

const MAN_LOGGING: &str = r#"
Progress and diagnostics are written to standard error through \fBtracing\fR.
Every replay yields one line: processed (with the output path), skipped, or failed (with the error chain), together with a progress marker such as \fB(3/12 25%)\fR.
.PP
The filter is taken from \fB\-\-log\-filter\fR, then \fBRUST_LOG\fR, then defaults to \fBholdtime=info\fR (\fBholdtime=debug\fR with \fB\-\-verbose\fR).
\fB\-\-log\-format json\fR switches to one JSON object per line.
"#;

const MAN_EXIT_STATUS: &str = r#"
.IP 0 4
All replays were processed or skipped, or the default replays folder was just created.
.IP 1 4
At least one replay failed; see the corresponding \fIerror_<name>.txt\fR.
.IP 2 4
Invalid arguments (for example an unknown input name in \fB\-\-key1\fR) or the output directory could not be created.
"#;

const MAN_ENVIRONMENT: &str = r#"
.TP
.B RUST_LOG
Log filter used when \fB\-\-log\-filter\fR is not given. Uses the \fBtracing_subscriber::EnvFilter\fR format.
.TP
.B RUST_BACKTRACE
Set to \fB1\fR or \fBfull\fR to print a backtrace on panic.
"#;

/// Generates the man page with custom sections.
fn generate_man_page(cmd: &clap::Command, path: &Path) -> Result<()> {
    let version = env!("CARGO_PKG_VERSION");
    let date = chrono::Local::now().format("%B %d, %Y").to_string();
    let bin_name = cmd.get_name();

    let mut buffer: Vec<u8> = Vec::new();

    // clap_mangen renders NAME, SYNOPSIS, DESCRIPTION and OPTIONS but no .TH header.
    writeln!(
        buffer,
        r#".TH "{}" 1 "{date}" "{version}" "User Commands""#,
        bin_name.to_uppercase()
    )?;
    Man::new(cmd.clone()).render(&mut buffer)?;

    let custom_sections = [
        ("HOLD TIMES", MAN_HOLD_TIMES),
        ("STATISTIC", MAN_STATISTIC),
        ("OUTPUT", MAN_OUTPUT),
        ("EXAMPLES", MAN_EXAMPLES),
        ("LOGGING", MAN_LOGGING),
        ("EXIT STATUS", MAN_EXIT_STATUS),
        ("ENVIRONMENT", MAN_ENVIRONMENT),
    ];

    for (title, template) in custom_sections {
        writeln!(buffer, ".SH {title}")?;
        writeln!(buffer, "{}", template.replace("{bin_name}", bin_name))?;
    }

    fs::write(path, buffer).with_context(|| format!("Failed to write man page to {path:?}"))?;
    Ok(())
}

/// Generates shell completion files.
fn generate_completions(cmd: &clap::Command, completions_dir: &Path) -> Result<()> {
    let bin_name = cmd.get_name().to_string();
    let shells = [
        (Shell::Bash, "bash"),
        (Shell::Elvish, "elv"),
        (Shell::Fish, "fish"),
        (Shell::PowerShell, "ps1"),
        (Shell::Zsh, "zsh"),
    ];

    for (shell, ext) in shells {
        let completions_path = completions_dir.join(format!("{bin_name}.{ext}"));
        println!("Generating completion file: {completions_path:?}");
        let mut file = fs::File::create(&completions_path)
            .with_context(|| format!("Failed to create completion file: {completions_path:?}"))?;
        generate(shell, &mut cmd.clone(), bin_name.clone(), &mut file);
    }
    Ok(())
}
