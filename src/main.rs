//! Entry point for the i18n bundle build pipeline CLI.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{
    Parser,
    Subcommand,
};
use js_i18n_bundler::build::{
    BuildContext,
    BuildError,
    LANG_TARGET,
    LangBundleOptions,
    LangBundleTech,
    MergeKeysetsOptions,
    MergeKeysetsTech,
};
use js_i18n_bundler::cache::RebuildCache;
use js_i18n_bundler::config::{
    self,
    BundlerSettings,
};
use js_i18n_bundler::input::ModuleLoader;
use tracing_subscriber::EnvFilter;

/// i18n bundle build pipeline for JavaScript projects.
#[derive(Debug, Parser)]
#[command(name = "js-i18n-bundler", version, about)]
struct Cli {
    /// Directory generated artifacts are written into.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Stem substituted for `?` in target templates; defaults to the
    /// output directory name.
    #[arg(long)]
    stem: Option<String>,

    /// Build step to run.
    #[command(subcommand)]
    command: Command,
}

/// Build steps exposed on the command line.
#[derive(Debug, Subcommand)]
enum Command {
    /// Merge per-language keyset fragments into a keysets artifact
    MergeKeysets {
        /// Language to merge fragments for; `all` merges the
        /// language-independent payloads.
        #[arg(long)]
        lang: String,

        /// Target template override (default: `?.keysets.{lang}.js`).
        #[arg(long)]
        target: Option<String>,

        /// Source roots scanned for translation directories, in merge order.
        roots: Vec<PathBuf>,
    },

    /// Compile a keysets artifact into a language bundle
    LangJs {
        /// Language to build the bundle for.
        #[arg(long)]
        lang: String,

        /// Target template override (default: `?.lang.{lang}.js`).
        #[arg(long)]
        target: Option<String>,

        /// Template of the consumed keysets artifact.
        #[arg(long)]
        keysets_target: Option<String>,
    },

    /// Run both stages for one or more languages
    Build {
        /// Languages to build, comma-separated (e.g. `all,en,ru`).
        #[arg(long, value_delimiter = ',', required = true)]
        langs: Vec<String>,

        /// Source roots scanned for translation directories, in merge order.
        roots: Vec<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(%err, "Build failed");
            ExitCode::FAILURE
        }
    }
}

/// Dispatches the parsed command line.
async fn run(cli: Cli) -> Result<(), BuildError> {
    let settings = config::load_or_default(std::env::current_dir().ok().as_deref())?;
    let ctx = match cli.stem {
        Some(stem) => BuildContext::with_stem(cli.out_dir, stem),
        None => BuildContext::new(cli.out_dir),
    };
    let loader = ModuleLoader::new();

    match cli.command {
        Command::MergeKeysets { lang, target, roots } => {
            let tech = MergeKeysetsTech::new(loader, settings);
            tech.build(&ctx, &roots, &MergeKeysetsOptions { target, lang }).await?;
        }
        Command::LangJs { lang, target, keysets_target } => {
            let cache = RebuildCache::new(expanded_lang_target(&ctx, target.as_deref(), &lang));
            let mut tech = LangBundleTech::new(loader, &settings, cache);
            tech.build(&ctx, &LangBundleOptions { target, keysets_target, lang }).await?;
        }
        Command::Build { langs, roots } => {
            // Targets are independent per language and build in parallel;
            // only the loader's parse cache is shared.
            let results = futures::future::join_all(
                langs
                    .iter()
                    .map(|lang| build_language(&loader, &settings, &ctx, &roots, lang)),
            )
            .await;
            results.into_iter().collect::<Result<Vec<_>, _>>()?;
        }
    }

    Ok(())
}

/// Runs both stages for one language.
async fn build_language(
    loader: &ModuleLoader,
    settings: &BundlerSettings,
    ctx: &BuildContext,
    roots: &[PathBuf],
    lang: &str,
) -> Result<(), BuildError> {
    let merge = MergeKeysetsTech::new(loader.clone(), settings.clone());
    merge
        .build(ctx, roots, &MergeKeysetsOptions { target: None, lang: lang.to_string() })
        .await?;

    let cache = RebuildCache::new(expanded_lang_target(ctx, None, lang));
    let mut bundle = LangBundleTech::new(loader.clone(), settings, cache);
    bundle
        .build(
            ctx,
            &LangBundleOptions { target: None, keysets_target: None, lang: lang.to_string() },
        )
        .await?;

    Ok(())
}

/// Expanded bundle target name used as the rebuild cache scope.
fn expanded_lang_target(ctx: &BuildContext, target: Option<&str>, lang: &str) -> String {
    ctx.target_path(target.unwrap_or(LANG_TARGET), lang).display().to_string()
}
