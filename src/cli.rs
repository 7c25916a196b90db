use crate::models::Provider;
use clap::Parser;

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "factcheck")]
#[command(
    about = "Fact-check claims and image URLs with a tool-using AI agent",
    long_about = None
)]
pub struct Args {
    #[arg(
        short = 'p',
        long = "provider",
        help = "AI provider to use (openai, gemini)"
    )]
    pub provider: Option<Provider>,

    #[arg(short = 'm', long = "model", help = "Model name for the selected provider")]
    pub model: Option<String>,

    #[arg(short = 'v', long = "verbose", help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        long = "max-iterations",
        help = "Maximum model invocations per turn before giving up"
    )]
    pub max_iterations: Option<usize>,

    #[arg(long = "list-models", help = "List the models offered for each provider")]
    pub list_models: bool,

    #[arg(
        long = "config-init",
        help = "Write an example config file to ~/.config/factcheck/factcheck.yaml"
    )]
    pub config_init: bool,

    #[arg(help = "Claim or image URL to check; starts an interactive session when omitted")]
    pub claim: Vec<String>,
}
