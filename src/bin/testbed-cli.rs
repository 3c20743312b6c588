use clap::{Parser, Subcommand, ValueEnum};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "testbed-cli")]
#[command(about = "Operator CLI for the telemetry testbed", long_about = None)]
struct Cli {
    /// Orchestrator base URL, including its route prefix
    #[arg(short, long, default_value = "http://localhost:3001/api")]
    url: String,

    /// Downstream-B base URL
    #[arg(long, default_value = "http://localhost:3002")]
    external_url: String,

    /// Downstream-C base URL
    #[arg(long, default_value = "http://localhost:3003")]
    internal_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the health of all three services
    Health,
    /// Run a profiling scenario on the orchestrator
    Profile { scenario: ProfileScenario },
    /// Run a tracing scenario on the orchestrator
    Trace { scenario: TraceScenario },
    /// Fan out traffic against the orchestrator
    Traffic,
    /// Run the prime sieve that usually takes the process down
    BreakApp,
    /// Ask Downstream-B for a specific status code
    Status { code: String },
    /// Run one of Downstream-C's pipelines
    Pipeline { name: PipelineName },
}

#[derive(Clone, Copy, ValueEnum)]
enum ProfileScenario {
    EfficientSort,
    SlowSort,
    LongFunction,
    HeapBreak,
    StackBreak,
    Recursive,
    CpuIntensive,
}

#[derive(Clone, Copy, ValueEnum)]
enum TraceScenario {
    MultipleRetries,
    InternalService,
    NetworkLatency,
}

#[derive(Clone, Copy, ValueEnum)]
enum PipelineName {
    Process,
    DatabaseOps,
    ExternalCalls,
    Flaky,
}

fn slug<T: ValueEnum>(value: &T) -> String {
    value
        .to_possible_value()
        .map(|v| v.get_name().to_string())
        .unwrap_or_default()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let orchestrator = cli.url.trim_end_matches('/');

    match cli.command {
        Commands::Health => {
            let orchestrator_root = url::Url::parse(orchestrator)?.join("/health")?;
            for url in [
                orchestrator_root.to_string(),
                format!("{}/health", cli.external_url),
                format!("{}/health", cli.internal_url),
            ] {
                println!("{url}");
                match client.get(&url).send().await {
                    Ok(res) => print_response(res).await?,
                    Err(e) => eprintln!("Error: {e}"),
                }
            }
        }
        Commands::Profile { scenario } => {
            let res = client
                .get(format!("{}/profile/{}", orchestrator, slug(&scenario)))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Trace { scenario } => {
            let res = client
                .get(format!("{}/trace/{}", orchestrator, slug(&scenario)))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Traffic => {
            let res = client
                .get(format!("{}/metrics/simulate-traffic", orchestrator))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::BreakApp => {
            let res = client.get(format!("{}/break-app", orchestrator)).send().await?;
            print_response(res).await?;
        }
        Commands::Status { code } => {
            let res = client
                .get(format!("{}/api/status/{}", cli.external_url, code))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Pipeline { name } => {
            let res = client
                .get(format!("{}/api/{}", cli.internal_url, slug(&name)))
                .send()
                .await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    println!("HTTP {}", status.as_u16());

    let text = res.text().await?;
    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{text}"),
    }
    Ok(())
}
