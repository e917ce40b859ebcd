use anyhow::{bail, Context};
use clap::{Args as ClapArgs, Parser, Subcommand};
use dotenv::dotenv;
use menu_expr::expr::{eval_expr, print_expression};
use menu_expr::menu::{MenuEnv, RuleSet, RuleSetLoader};
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the syntax tree of an expression
    Print {
        /// The expression to print
        #[arg(short, long)]
        expr: String,
    },
    /// Evaluate an expression against a user context
    Eval {
        /// The expression to evaluate
        #[arg(short, long)]
        expr: String,

        #[command(flatten)]
        context: ContextArgs,
    },
    /// Report which rules of a rule file apply to a user context
    Rules {
        /// Path to the YAML rule file
        #[arg(short, long)]
        file: PathBuf,

        /// Print each rule's syntax tree before evaluating
        #[arg(long)]
        tree: bool,

        #[command(flatten)]
        context: ContextArgs,
    },
}

#[derive(ClapArgs, Debug)]
struct ContextArgs {
    /// YAML or JSON file holding Ucid, Appid and SdkVersion
    #[arg(short, long, conflicts_with_all = ["ucid", "appid", "sdk_version"])]
    context: Option<PathBuf>,

    /// User id; ids starting with "B" are B-side users
    #[arg(long)]
    ucid: Option<String>,

    /// Application id
    #[arg(long)]
    appid: Option<String>,

    /// SDK version as MAJOR.MINOR.PATCH
    #[arg(long)]
    sdk_version: Option<String>,
}

impl ContextArgs {
    fn resolve(self, loader: &RuleSetLoader) -> anyhow::Result<MenuEnv> {
        if let Some(path) = self.context {
            return loader
                .load_context(&path)
                .with_context(|| format!("Failed to load context from {}", path.display()));
        }

        match (self.ucid, self.appid, self.sdk_version) {
            (Some(ucid), Some(appid), Some(sdk_version)) => {
                Ok(MenuEnv::new(ucid, appid, sdk_version))
            }
            _ => bail!("Either --context or all of --ucid, --appid and --sdk-version are required"),
        }
    }
}

fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();
    let loader = RuleSetLoader::new();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match args.command {
        Commands::Print { expr } => {
            print_expression(&expr, &mut out).context("Failed to print expression")?;
        }
        Commands::Eval { expr, context } => {
            let env = context.resolve(&loader)?;
            log::info!(
                "Evaluating against Ucid={} Appid={} SdkVersion={}",
                env.ucid,
                env.appid,
                env.sdk_version
            );
            let result = eval_expr(&expr, &env).context("Failed to evaluate expression")?;
            writeln!(out, "{}", result)?;
        }
        Commands::Rules {
            file,
            tree,
            context,
        } => {
            let env = context.resolve(&loader)?;
            let def = loader
                .load_rule_set(&file)
                .with_context(|| format!("Failed to load rule file {}", file.display()))?;
            let rules = RuleSet::compile(&def)?;
            if tree {
                rules.render(&mut out)?;
            }

            let matched = rules.matching(&env)?;
            log::info!(
                "{} of {} rules in '{}' apply",
                matched.len(),
                rules.rules().len(),
                rules.name()
            );
            for name in matched {
                writeln!(out, "{}", name)?;
            }
        }
    }

    Ok(())
}
