use std::path::{Path, PathBuf};

use anyhow::Context;
use colored::Colorize;
use serde_json::json;
use spm_diff::{diff_profiles, ProfileChange, ValueDiff};
use spm_merge::{MergeConfig, MergeDirection, MergeReport, ProfileMerger, Side};
use spm_profile::{FieldRecord, Profile};
use spm_schema::SchemaRegistry;
use spm_types::ApiVersion;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let settings = Settings::resolve(cli.api_version, cli.config.as_deref())?;
    match cli.command {
        Command::Scan(args) => cmd_scan(&settings, args, cli.format),
        Command::Merge(args) => cmd_merge(&settings, args, cli.format).map(drop),
        Command::Diff(args) => cmd_diff(&settings, args, cli.format),
        Command::Categories(args) => cmd_categories(&settings, args, cli.format),
    }
}

/// Config file values with command-line overrides applied.
struct Settings {
    version: ApiVersion,
    config: MergeConfig,
}

impl Settings {
    fn resolve(api_version: Option<ApiVersion>, config_path: Option<&Path>) -> anyhow::Result<Self> {
        let config = match config_path {
            Some(path) => MergeConfig::load(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => MergeConfig::default(),
        };
        let version = match api_version {
            Some(v) => v,
            None => config.version()?,
        };
        Ok(Self { version, config })
    }
}

fn open(name: &str, path: &Path, version: ApiVersion) -> anyhow::Result<Profile> {
    Profile::open(name, path, version).with_context(|| format!("failed to read profile {}", path.display()))
}

fn print_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn render_attributes(record: &FieldRecord) -> String {
    record
        .attributes()
        .iter()
        .filter_map(|(name, value)| value.render().map(|v| format!("{name}={v}")))
        .collect::<Vec<_>>()
        .join(" ")
}

fn cmd_scan(settings: &Settings, args: ScanArgs, format: OutputFormat) -> anyhow::Result<()> {
    let profile = open("profile", &args.file, settings.version)?;
    let groups = profile.by_category();
    let selected: Vec<(&str, &Vec<&FieldRecord>)> = groups
        .iter()
        .filter(|(category, _)| args.category.as_deref().map_or(true, |c| c == **category))
        .map(|(category, records)| (*category, records))
        .collect();

    if format == OutputFormat::Json {
        let records: Vec<_> = selected
            .iter()
            .flat_map(|(_, records)| records.iter())
            .map(|r| json!({ "identity": r.identity(), "category": r.category_name(), "attributes": r.attributes() }))
            .collect();
        return print_json(&json!({
            "path": args.file,
            "version": settings.version,
            "namespace": profile.namespace(),
            "records": records,
        }));
    }

    println!(
        "{} {} ({} records, API {})",
        "Profile".bold(),
        args.file.display().to_string().cyan(),
        profile.len(),
        settings.version
    );
    for (category, records) in selected {
        println!("\n{} ({})", category.yellow().bold(), records.len());
        for record in records {
            if record.is_scalar() {
                println!("  {}", record.value().map(ToString::to_string).unwrap_or_default());
            } else {
                println!("  {}  {}", record.identity().green(), render_attributes(record).dimmed());
            }
        }
    }
    Ok(())
}

fn cmd_merge(settings: &Settings, args: MergeArgs, format: OutputFormat) -> anyhow::Result<MergeReport> {
    let mut merger = ProfileMerger::new(settings.version);
    let direction = if args.a_into_b {
        MergeDirection::AIntoB
    } else {
        settings.config.direction()
    };
    merger.set_direction(direction);
    merger
        .load_a(&args.a)
        .with_context(|| format!("failed to read profile A {}", args.a.display()))?;
    merger
        .load_b(&args.b)
        .with_context(|| format!("failed to read profile B {}", args.b.display()))?;

    let report = merger.merge()?;
    let output: Option<PathBuf> = if args.dry_run {
        None
    } else {
        let path = args.output.unwrap_or_else(|| settings.config.output_path.clone());
        merger
            .save_merged(&path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        Some(path)
    };

    if format == OutputFormat::Json {
        print_json(&json!({ "report": &report, "output": output }))?;
        return Ok(report);
    }

    println!(
        "Merged {} ({} records) with {} ({} records), {}",
        args.a.display().to_string().cyan(),
        merger.profile(Side::A)?.len(),
        args.b.display().to_string().cyan(),
        merger.profile(Side::B)?.len(),
        direction.to_string().yellow()
    );
    print_value_diffs(&report.diffs);
    match &output {
        Some(path) => println!(
            "{} Wrote {} records to {}",
            "✓".green().bold(),
            report.merged_records,
            path.display().to_string().bold()
        ),
        None => println!("{} Dry run: {} records not written", "•".yellow(), report.merged_records),
    }
    Ok(report)
}

fn print_value_diffs(diffs: &[ValueDiff]) {
    if diffs.is_empty() {
        println!("No conflicting records.");
        return;
    }
    println!("{} conflicting records:", diffs.len().to_string().bold());
    for diff in diffs {
        println!("  {}", diff.identity.yellow());
        for (name, base, overlay) in diff.changed_values() {
            println!("    {name}: {} -> {}", base.red(), overlay.green());
        }
    }
}

fn cmd_diff(settings: &Settings, args: DiffArgs, format: OutputFormat) -> anyhow::Result<()> {
    let a = open("A", &args.a, settings.version)?;
    let b = open("B", &args.b, settings.version)?;
    let diff = diff_profiles(&a, &b);

    if format == OutputFormat::Json {
        return print_json(&diff);
    }
    if diff.is_empty() {
        println!("No differences.");
        return Ok(());
    }
    for change in &diff.changes {
        match change {
            ProfileChange::OnlyInA { identity } => println!("{} {}", "-".red(), identity),
            ProfileChange::OnlyInB { identity } => println!("{} {}", "+".green(), identity),
            ProfileChange::Modified(d) => {
                println!("{} {}", "~".yellow(), d.identity);
                for (name, base, overlay) in d.changed_values() {
                    println!("    {name}: {} -> {}", base.red(), overlay.green());
                }
            }
        }
    }
    println!(
        "\n{} only in A, {} only in B, {} modified",
        diff.only_in_a(),
        diff.only_in_b(),
        diff.modifications()
    );
    Ok(())
}

fn cmd_categories(settings: &Settings, args: CategoriesArgs, format: OutputFormat) -> anyhow::Result<()> {
    let registry = SchemaRegistry::global();
    let categories = if args.all {
        registry.categories()
    } else {
        registry.active_at(settings.version)
    };

    if format == OutputFormat::Json {
        return print_json(&categories);
    }
    for category in categories {
        let attrs: Vec<String> = category
            .attributes_at(settings.version)
            .map(|a| if a.toggle { format!("{}*", a.name) } else { a.name.to_string() })
            .collect();
        let name = if category.is_active(settings.version) {
            category.name.green()
        } else {
            category.name.dimmed()
        };
        println!("{:<28} {:<8} {}", name, category.versions.to_string(), attrs.join(" "));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use spm_types::AttrValue;

    fn write(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(
            &path,
            format!(r#"<Profile xmlns="http://soap.sforce.com/2006/04/metadata">{body}</Profile>"#),
        )
        .unwrap();
        path
    }

    fn inputs(dir: &Path) -> (PathBuf, PathBuf) {
        let a = write(
            dir,
            "a.profile",
            "<classAccesses><apexClass>Foo</apexClass><enabled>true</enabled></classAccesses><fullName>Admin</fullName>",
        );
        let b = write(
            dir,
            "b.profile",
            "<classAccesses><apexClass>Foo</apexClass><enabled>false</enabled></classAccesses>",
        );
        (a, b)
    }

    fn defaults() -> Settings {
        Settings::resolve(None, None).unwrap()
    }

    #[test]
    fn settings_prefer_command_line_version() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("spm.toml");
        std::fs::write(&config, "api_version = 40\n").unwrap();
        assert_eq!(Settings::resolve(None, Some(config.as_path())).unwrap().version, ApiVersion(40));
        assert_eq!(
            Settings::resolve(Some(ApiVersion(50)), Some(config.as_path())).unwrap().version,
            ApiVersion(50)
        );
        assert_eq!(defaults().version, ApiVersion(54));
    }

    #[test]
    fn merge_writes_output_with_b_winning() {
        let dir = tempfile::tempdir().unwrap();
        let (a, b) = inputs(dir.path());
        let out = dir.path().join("merged.profile");
        let args = MergeArgs { a, b, output: Some(out.clone()), a_into_b: false, dry_run: false };
        let report = cmd_merge(&defaults(), args, OutputFormat::Text).unwrap();
        assert_eq!(report.diffs.len(), 1);
        assert_eq!(report.merged_records, 2);

        let merged = Profile::open("m", &out, ApiVersion(54)).unwrap();
        assert_eq!(merged.get("classAccesses:Foo").unwrap().get("enabled"), Some(&AttrValue::Bool(false)));
        assert_eq!(merged.get("fullName").unwrap().value(), Some(&AttrValue::text("Admin")));
    }

    #[test]
    fn merge_a_into_b_lets_a_win() {
        let dir = tempfile::tempdir().unwrap();
        let (a, b) = inputs(dir.path());
        let out = dir.path().join("merged.profile");
        let args = MergeArgs { a, b, output: Some(out.clone()), a_into_b: true, dry_run: false };
        cmd_merge(&defaults(), args, OutputFormat::Json).unwrap();
        let merged = Profile::open("m", &out, ApiVersion(54)).unwrap();
        assert_eq!(merged.get("classAccesses:Foo").unwrap().get("enabled"), Some(&AttrValue::Bool(true)));
    }

    #[test]
    fn dry_run_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let (a, b) = inputs(dir.path());
        let out = dir.path().join("merged.profile");
        let args = MergeArgs { a, b, output: Some(out.clone()), a_into_b: false, dry_run: true };
        cmd_merge(&defaults(), args, OutputFormat::Text).unwrap();
        assert!(!out.exists());
    }

    #[test]
    fn merge_reports_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let (a, _) = inputs(dir.path());
        let args = MergeArgs {
            a,
            b: dir.path().join("missing.profile"),
            output: None,
            a_into_b: false,
            dry_run: true,
        };
        let err = cmd_merge(&defaults(), args, OutputFormat::Text).unwrap_err();
        assert!(err.to_string().contains("profile B"));
    }

    #[test]
    fn scan_diff_and_categories_run() {
        let dir = tempfile::tempdir().unwrap();
        let (a, b) = inputs(dir.path());
        let settings = defaults();
        cmd_scan(&settings, ScanArgs { file: a.clone(), category: None }, OutputFormat::Text).unwrap();
        cmd_scan(&settings, ScanArgs { file: a.clone(), category: Some("fullName".into()) }, OutputFormat::Json).unwrap();
        cmd_diff(&settings, DiffArgs { a, b }, OutputFormat::Text).unwrap();
        cmd_categories(&settings, CategoriesArgs { all: true }, OutputFormat::Text).unwrap();
        cmd_categories(&settings, CategoriesArgs { all: false }, OutputFormat::Json).unwrap();
    }
}
