//! Command implementations

use std::io::Write as _;
use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use crate::adapters::{FFprobeAdapter, TomlConfigStore};
use crate::app::server_interactor::check_dependencies;
use crate::app::{
    AnalyzeResponse, AppContainer, BatchRequest, DependencyStatus, EditRequest, EditResponse,
    ServerHealth, ServerStatus,
};
use crate::cli::args::{AnalyzeArgs, BatchArgs, CheckServerArgs, EditArgs, InteractiveArgs, SetupArgs};
use crate::config_initialization::AppConfig;
use crate::domain::model::{AspectRatio, EditOptions, EditingStyle, Quality, TimeSpec};
use crate::utils::path::{ensure_dir, generate_unique_name, scan_videos};
use crate::utils::{format_elapsed, format_file_size, format_seconds};

/// Build edit options from raw command-line strings
pub fn edit_options(
    style: &str,
    duration: Option<&str>,
    quality: &str,
    aspect_ratio: &str,
    add_music: bool,
    auto_subtitles: bool,
) -> Result<EditOptions> {
    let target_duration = duration
        .map(|d| {
            TimeSpec::parse(d)
                .map(|t| t.as_seconds())
                .with_context(|| format!("Invalid duration '{}'", d))
        })
        .transpose()?;

    Ok(EditOptions {
        style: EditingStyle::parse(style).context("Invalid style")?,
        target_duration,
        quality: Quality::parse(quality).context("Invalid quality")?,
        aspect_ratio: AspectRatio::parse(aspect_ratio).context("Invalid aspect ratio")?,
        add_music,
        auto_subtitles,
    })
}

/// Execute the edit command
pub async fn edit(container: &dyn AppContainer, args: EditArgs) -> Result<()> {
    let options = edit_options(
        &args.style,
        args.duration.as_deref(),
        &args.quality,
        &args.aspect_ratio,
        args.add_music,
        args.auto_subtitles,
    )?;

    let mut request = EditRequest::new(&args.input, options);
    if let Some(name) = args.output {
        request = request.with_output_name(name);
    }

    let started = Instant::now();
    let response = container.edit_interactor().execute(request).await;
    info!("Edit finished in {}", format_elapsed(started.elapsed()));

    report_edit(&response, args.json)
}

fn report_edit(response: &EditResponse, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(response)?);
    } else if response.success {
        println!("✅ Draft created: {}", response.draft_path.as_deref().unwrap_or_default());
        if let Some(plan) = &response.plan {
            println!(
                "   Style: {}, target {}, {} cut(s), {} text overlay(s)",
                plan.style,
                format_seconds(plan.target_duration),
                plan.cuts.len(),
                plan.text_elements.len()
            );
        }
        for warning in &response.warnings {
            println!("⚠️  {}", warning);
        }
    }

    if !response.success {
        bail!(
            "Editing {} failed: {}",
            response.input_file,
            response.error.as_deref().unwrap_or("unknown error")
        );
    }
    Ok(())
}

/// Execute the batch command
pub async fn batch(container: &dyn AppContainer, config: &AppConfig, args: BatchArgs) -> Result<()> {
    let inputs = scan_videos(&args.input_dir, args.recursive)
        .with_context(|| format!("Failed to scan {}", args.input_dir.display()))?;
    if inputs.is_empty() {
        warn!("No video files found in {}", args.input_dir.display());
        println!("No video files found in {}", args.input_dir.display());
        return Ok(());
    }

    let options = edit_options(&args.style, None, "1080p", "16:9", false, false)?;
    if let Some(dir) = &args.output_dir {
        ensure_dir(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    let started = Instant::now();
    let response = container
        .edit_interactor()
        .process_batch(BatchRequest {
            inputs,
            options,
            output_dir: args.output_dir.clone(),
            parallel: args.parallel.unwrap_or(config.batch.parallel_jobs),
        })
        .await;
    info!("Batch finished in {}", format_elapsed(started.elapsed()));

    if args.json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        for result in &response.results {
            match (&result.draft_path, &result.error) {
                (Some(draft), _) if result.success => {
                    println!("✅ {} -> {}", result.input_file, draft)
                }
                (_, error) => println!(
                    "❌ {}: {}",
                    result.input_file,
                    error.as_deref().unwrap_or("unknown error")
                ),
            }
        }
        println!(
            "Processed {} video(s): {} succeeded, {} failed",
            response.results.len(),
            response.succeeded,
            response.failed
        );
    }

    if response.succeeded == 0 {
        bail!("No videos were processed successfully");
    }
    Ok(())
}

/// Line-oriented question/answer helper over any async reader
pub struct Prompter<R> {
    reader: R,
}

impl<R: AsyncBufRead + Unpin> Prompter<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Ask a question; an empty answer or end of input yields `default`
    pub async fn ask(&mut self, question: &str, default: &str) -> Result<String> {
        print!("{} [{}]: ", question, default);
        std::io::stdout().flush()?;

        let mut line = String::new();
        self.reader.read_line(&mut line).await?;
        let answer = line.trim();
        Ok(if answer.is_empty() {
            default.to_string()
        } else {
            answer.to_string()
        })
    }

    pub async fn confirm(&mut self, question: &str) -> Result<bool> {
        let answer = self.ask(question, "n").await?;
        Ok(matches!(answer.to_lowercase().as_str(), "y" | "yes"))
    }

    /// Ask until the answer parses
    async fn ask_parsed<T, E: std::fmt::Display>(
        &mut self,
        question: &str,
        default: &str,
        parse: impl Fn(&str) -> std::result::Result<T, E>,
    ) -> Result<T> {
        const ATTEMPTS: usize = 3;
        for _ in 0..ATTEMPTS {
            let answer = self.ask(question, default).await?;
            match parse(&answer) {
                Ok(value) => return Ok(value),
                Err(e) => println!("  {}", e),
            }
        }
        bail!("Too many invalid answers for '{}'", question)
    }
}

/// Collect edit options and an optional draft name through prompts
pub async fn prompt_options<R: AsyncBufRead + Unpin>(
    prompter: &mut Prompter<R>,
) -> Result<(EditOptions, Option<String>)> {
    println!("Editing styles: {}", EditingStyle::CHOICES.join(", "));
    let style = prompter.ask_parsed("Style", "auto", EditingStyle::parse).await?;

    let target_duration = prompter
        .ask_parsed("Target duration (seconds or MM:SS, blank for automatic)", "", |answer| {
            if answer.is_empty() {
                Ok(None)
            } else {
                TimeSpec::parse(answer).map(|t| Some(t.as_seconds()))
            }
        })
        .await?;

    let add_music = prompter.confirm("Add background music? (y/n)").await?;
    let auto_subtitles = prompter.confirm("Add automatic subtitles? (y/n)").await?;
    let quality = prompter
        .ask_parsed("Quality (720p, 1080p, 4k)", "1080p", Quality::parse)
        .await?;
    let aspect_ratio = prompter
        .ask_parsed("Aspect ratio (16:9, 9:16, 1:1, 4:3)", "16:9", AspectRatio::parse)
        .await?;
    let name = prompter.ask("Draft name (blank for automatic)", "").await?;

    let options = EditOptions {
        style,
        target_duration,
        quality,
        aspect_ratio,
        add_music,
        auto_subtitles,
    };
    Ok((options, Some(name).filter(|n| !n.is_empty())))
}

/// Execute the interactive command
pub async fn interactive(container: &dyn AppContainer, args: InteractiveArgs) -> Result<()> {
    println!("🎬 Interactive editing: {}", args.input.display());

    let mut prompter = Prompter::new(BufReader::new(tokio::io::stdin()));
    let (options, name) = prompt_options(&mut prompter).await?;
    let name = name.unwrap_or_else(|| generate_unique_name(&args.input));

    if !prompter.confirm(&format!("Create draft '{}'? (y/n)", name)).await? {
        println!("Cancelled");
        return Ok(());
    }

    let request = EditRequest::new(&args.input, options).with_output_name(name);
    let response = container.edit_interactor().execute(request).await;
    report_edit(&response, false)
}

/// Execute the analyze command
pub async fn analyze(container: &dyn AppContainer, args: AnalyzeArgs) -> Result<()> {
    let response = container
        .analyze_interactor()
        .execute(&args.input)
        .await
        .with_context(|| format!("Failed to analyze {}", args.input.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        print_analysis(&response);
    }
    Ok(())
}

fn print_analysis(response: &AnalyzeResponse) {
    let info = &response.video_info;
    println!("📹 {}", response.input_file);
    println!(
        "   Duration: {} ({:.2}s)",
        format_seconds(info.duration()),
        info.duration()
    );
    println!(
        "   Resolution: {}x{} ({}), {:.2} fps, {}",
        info.width(),
        info.height(),
        info.aspect_ratio(),
        info.fps(),
        info.codec()
    );
    println!(
        "   Audio: {}, size: {}",
        if info.has_audio() { "yes" } else { "no" },
        format_file_size(info.file_size_bytes())
    );

    if let Some(content) = &response.content {
        println!(
            "   Brightness: {:?}, motion: {:?}, {} scene change(s)",
            content.brightness_level,
            content.motion_level,
            content.scene_changes.len()
        );
    }

    println!("   Complexity: {}", response.complexity);
    println!(
        "   Content type: {}, recommended style: {}",
        response.editing.content_type, response.editing.recommended_style
    );

    for observation in &response.observations {
        println!("   • {}", observation);
    }
    if !response.editing.suggestions.is_empty() {
        println!("Suggestions:");
        for suggestion in &response.editing.suggestions {
            println!("   • {}", suggestion);
        }
    }
    println!("Suggested cuts ({}):", response.recommended_cuts);
    for cut in &response.cut_suggestions {
        println!("   {} - {}", format_seconds(cut.start), format_seconds(cut.end));
    }
}

/// Execute the check-server command
pub async fn check_server(container: &dyn AppContainer, args: CheckServerArgs) -> Result<()> {
    let status = container.server_interactor().check().await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        print_server_status(&status);
    }

    if status.health == ServerHealth::Down {
        bail!("CapCut MCP server at {} is not reachable", status.url);
    }
    Ok(())
}

fn print_server_status(status: &ServerStatus) {
    match status.health {
        ServerHealth::Healthy => println!("✅ CapCut MCP server is running at {}", status.url),
        ServerHealth::Degraded => println!(
            "⚠️  CapCut MCP server at {} is missing some endpoints",
            status.url
        ),
        ServerHealth::Down => {
            println!("❌ CapCut MCP server is not running at {}", status.url);
            println!("   Start it with: cd capcut-mcp && python main.py");
            println!("   or pass --start-server to launch it automatically");
        }
    }
    for endpoint in &status.endpoints {
        println!("   {} {}", mark(endpoint.available), endpoint.endpoint);
    }
    print_dependencies(&status.dependencies);
}

fn mark(ok: bool) -> &'static str {
    if ok {
        "✓"
    } else {
        "✗"
    }
}

fn print_dependencies(deps: &DependencyStatus) {
    println!("Dependencies:");
    println!(
        "   {} ffprobe{}",
        mark(deps.ffprobe_available),
        if deps.ffprobe_available { "" } else { " not found (install FFmpeg)" }
    );
    println!(
        "   {} capcut-mcp{}",
        mark(deps.capcut_mcp_exists),
        if deps.capcut_mcp_exists { "" } else { " checkout not found" }
    );
    println!(
        "   {} ANTHROPIC_API_KEY{}",
        mark(deps.api_key_configured),
        if deps.api_key_configured { "" } else { " not set (rule-based plans only)" }
    );
}

/// Execute the setup command in the current directory
pub async fn setup(config_path: &Path, args: SetupArgs) -> Result<()> {
    let mut detected = AppConfig::default();
    detected.apply_env(|name| std::env::var(name).ok());
    setup_in(Path::new("."), config_path, args, &detected).await?;
    Ok(())
}

/// Create the working directories, default configuration and `.env` under `root`,
/// then report which prerequisites from `detected` are in place
pub async fn setup_in(
    root: &Path,
    config_path: &Path,
    args: SetupArgs,
    detected: &AppConfig,
) -> Result<DependencyStatus> {
    let config = AppConfig::default();
    let config_path = root.join(config_path);

    let config_dir = config_path.parent().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf());
    for dir in [
        config_dir,
        root.join(&config.paths.output_dir),
        root.join(&config.paths.music_dir),
    ] {
        ensure_dir(&dir).with_context(|| format!("Failed to create {}", dir.display()))?;
        println!("📁 {}", dir.display());
    }

    if config_path.exists() && !args.force {
        println!(
            "Configuration already exists at {} (use --force to overwrite)",
            config_path.display()
        );
    } else {
        TomlConfigStore::new(&config_path)
            .save(&config)
            .context("Failed to write configuration")?;
        println!("📝 Wrote {}", config_path.display());
    }

    let key_stored = args.api_key.is_some();
    if let Some(key) = args.api_key {
        write_env_key(&root.join(".env"), "ANTHROPIC_API_KEY", &key)?;
        println!("🔑 Stored ANTHROPIC_API_KEY in .env");
    }

    let probe = FFprobeAdapter::new(detected.tools.ffprobe_path.clone())
        .with_timeout(Duration::from_secs(detected.tools.timeout_secs));
    let api_key_configured = key_stored
        || detected
            .anthropic
            .api_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty());
    let mcp_path = root.join(&detected.server.mcp_path);
    let deps = check_dependencies(&probe, &mcp_path, api_key_configured).await;
    print_dependencies(&deps);
    if deps.missing_required() {
        warn!("Setup finished with missing dependencies");
        println!("⚠️  Videos cannot be probed until ffprobe is installed and on PATH (or FFPROBE_PATH is set).");
    }

    println!("Setup complete. Clone https://github.com/fancyboi999/capcut-mcp.git into ./capcut-mcp to run the server.");
    Ok(deps)
}

/// Set `name=value` in an env file, replacing any previous assignment
pub fn write_env_key(path: &Path, name: &str, value: &str) -> Result<()> {
    let existing = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(e).with_context(|| format!("Failed to read {}", path.display())),
    };

    let prefix = format!("{}=", name);
    let assignment = format!("{}{}", prefix, value);
    let mut lines: Vec<&str> = existing
        .lines()
        .filter(|line| !line.trim_start().starts_with(&prefix))
        .collect();
    lines.push(&assignment);

    std::fs::write(path, lines.join("\n") + "\n")
        .with_context(|| format!("Failed to write {}", path.display()))
}
