use clap::{Parser, Subcommand};
use rowbind_api::source::ResultSet;
use rowbind_api::value::Value;
use rowbind_config_hcl::HclParser;
use rowbind_engine::{EngineError, RowbindConfig, SessionFactory, value_from_json, value_to_json};

#[derive(Parser)]
#[command(name = "rowbind", about = "Run configured statements against a row dataset")]
struct Cli {
    /// Path to the TOML or HCL configuration file.
    #[arg(long, default_value = "rowbind.toml", env = "ROWBIND_CONFIG")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the configuration and list its statements.
    Check,
    /// Run a statement and print each row as a JSON object.
    Query {
        statement: String,
        /// Statement parameter as JSON, typed by the filter column.
        #[arg(long)]
        param: Option<String>,
    },
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("invalid --param: {0}")]
    Param(String),
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        tracing::error!(error = %e, "rowbind failed");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), CliError> {
    tracing::info!(config = %cli.config, "loading configuration");
    let config = RowbindConfig::load_with(&cli.config, &[&HclParser])?;
    let factory = SessionFactory::from_config(config)?;

    match &cli.command {
        Commands::Check => {
            for stmt in factory.statements() {
                let filter = stmt.filter_column.as_deref().unwrap_or("-");
                println!("{}\ttable={}\tfilter={filter}", stmt.id, stmt.table);
            }
            Ok(())
        }
        Commands::Query { statement, param } => {
            let param = param
                .as_deref()
                .map(|raw| parse_param(&factory, statement, raw))
                .transpose()?;
            let rs = factory.open_session().select_rows(statement, param)?;
            print_rows(&rs);
            Ok(())
        }
    }
}

fn parse_param(factory: &SessionFactory, statement: &str, raw: &str) -> Result<Value, CliError> {
    let json: serde_json::Value =
        serde_json::from_str(raw).map_err(|e| CliError::Param(e.to_string()))?;

    let stmt = factory
        .statement(statement)
        .ok_or_else(|| EngineError::StatementNotFound(statement.to_string()))?;
    let Some(filter) = &stmt.filter_column else {
        return Err(CliError::Param(format!("'{statement}' takes no parameter")));
    };
    let column = factory
        .table_schema(&stmt.table)
        .and_then(|schema| {
            let idx = schema.index_of(filter)?;
            schema.columns.into_iter().nth(idx)
        })
        .ok_or_else(|| CliError::Param(format!("column '{filter}' not found")))?;

    value_from_json(&column, &json).map_err(|e| CliError::Param(e.to_string()))
}

fn print_rows(rs: &ResultSet) {
    for row in &rs.rows {
        let object: serde_json::Map<String, serde_json::Value> = rs
            .schema
            .columns
            .iter()
            .zip(&row.0)
            .map(|(column, value)| (column.name.clone(), value_to_json(value)))
            .collect();
        println!("{}", serde_json::Value::Object(object));
    }
    tracing::info!(rows = rs.len(), "query complete");
}
