use clap::{Parser, Subcommand, ValueEnum};
use site_brochure::LinkFailurePolicy;
use site_brochure::config::{BrochureConfig, ClassifierKind, FetcherKind};
use site_brochure::prompts::Tone;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "site-brochure")]
#[command(about = "Summarizes websites and writes company brochures from them")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// JSON configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Generation backend (gpt or claude)
    #[arg(short, long, global = true)]
    pub model: Option<String>,

    /// How pages are retrieved
    #[arg(long, value_enum, global = true)]
    pub fetcher: Option<FetcherArg>,

    /// How relevant links are chosen
    #[arg(long, value_enum, global = true)]
    pub classifier: Option<ClassifierArg>,

    /// Number of linked pages fetched at once
    #[arg(long, global = true)]
    pub concurrency: Option<usize>,

    /// Leave out linked pages that fail to load instead of stopping
    #[arg(long, global = true)]
    pub skip_failed_links: bool,

    /// Character budget of the document sent to the model
    #[arg(long, global = true)]
    pub char_limit: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Summarize a single page
    Summarize { url: String },

    /// List the links on a page that are relevant for a brochure
    Links { url: String },

    /// Write a brochure for a company from its landing page
    Brochure {
        company: String,
        url: String,

        /// Print the brochure as it is generated
        #[arg(long)]
        stream: bool,

        /// Voice of the brochure
        #[arg(long, value_enum)]
        tone: Option<ToneArg>,

        /// Print the prompt instead of calling the model
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum FetcherArg {
    Http,
    Webdriver,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ClassifierArg {
    Model,
    Rules,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ToneArg {
    Professional,
    Humorous,
}

impl Args {
    /// Layer command-line flags over the loaded configuration
    pub fn apply(&self, config: &mut BrochureConfig) {
        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        if let Some(fetcher) = self.fetcher {
            config.fetcher = match fetcher {
                FetcherArg::Http => FetcherKind::Http,
                FetcherArg::Webdriver => FetcherKind::Webdriver,
            };
        }
        if let Some(classifier) = self.classifier {
            config.classifier = match classifier {
                ClassifierArg::Model => ClassifierKind::Model,
                ClassifierArg::Rules => ClassifierKind::Rules,
            };
        }
        if let Some(concurrency) = self.concurrency {
            config.max_concurrency = concurrency.max(1);
        }
        if self.skip_failed_links {
            config.link_failure = LinkFailurePolicy::SkipAndContinue;
        }
        if let Some(char_limit) = self.char_limit {
            config.char_limit = char_limit;
        }
        if let Command::Brochure { tone: Some(tone), .. } = &self.command {
            config.tone = match tone {
                ToneArg::Professional => Tone::Professional,
                ToneArg::Humorous => Tone::Humorous,
            };
        }
    }
}
