//! `somnia`: terminal questionnaire for the Somnia diagnosis server.
//!
//! # Usage
//!
//! ```
//! somnia diagnose
//! somnia diagnose --disease P02 --name Sari --age 34 --gender female
//! somnia --url http://localhost:8080 history --limit 10
//! somnia --config ~/.config/somnia/config.toml diseases
//! ```

mod client;
mod prompt;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use client::{ApiClient, ApiConfig};
use serde::Deserialize;
use somnia_core::{StartRequest, StepView, session::Biodata};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "somnia", about = "Sleep-disorder questionnaire over the Somnia API")]
struct Args {
  /// Path to a TOML config file (url).
  #[arg(short, long, value_name = "FILE")]
  config: Option<std::path::PathBuf>,

  /// Base URL of the Somnia server (default: http://localhost:8080).
  #[arg(long, env = "SOMNIA_URL")]
  url: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Answer yes/no questions until a diagnosis is reached.
  Diagnose {
    /// Test a single disease instead of searching all of them.
    #[arg(long, value_name = "CODE")]
    disease: Option<String>,

    /// Patient name; together with --gender records biodata in the history.
    #[arg(long, requires = "gender")]
    name: Option<String>,

    #[arg(long, default_value_t = 0)]
    age: u32,

    #[arg(long, requires = "name")]
    gender: Option<String>,

    #[arg(long, default_value = "")]
    address: String,
  },
  /// List recent diagnosis results, newest first.
  History {
    #[arg(long, default_value_t = 20)]
    limit: usize,
  },
  /// List diseases in search order with their required symptoms.
  Diseases,
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url: String,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let args = Args::parse();

  // Load config file if provided.
  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  let api_config = ApiConfig {
    base_url: args
      .url
      .or_else(|| (!file_cfg.url.is_empty()).then(|| file_cfg.url.clone()))
      .unwrap_or_else(|| "http://localhost:8080".to_string()),
  };
  tracing::debug!(base_url = %api_config.base_url, "using server");

  let client = ApiClient::new(api_config)?;

  match args.command {
    Command::Diagnose { disease, name, age, gender, address } => {
      let biodata = name.zip(gender).map(|(name, gender)| Biodata {
        name,
        age,
        gender,
        address,
      });
      diagnose(&client, StartRequest { biodata, disease_code: disease }).await
    }
    Command::History { limit } => {
      for entry in client.list_history(limit).await? {
        println!("{}", prompt::history_line(&entry));
      }
      Ok(())
    }
    Command::Diseases => {
      for detail in client.list_diseases().await? {
        let d = &detail.disease;
        println!(
          "{} {:<32} priority {:>3}  [{}]",
          d.code,
          d.name,
          d.priority,
          detail.symptoms.join(", ")
        );
      }
      Ok(())
    }
  }
}

// ─── Questionnaire ────────────────────────────────────────────────────────────

async fn diagnose(client: &ApiClient, request: StartRequest) -> Result<()> {
  let mut step = client.start(&request).await?;
  let mut stdin = BufReader::new(tokio::io::stdin()).lines();

  while let Some(question) = step.question.clone() {
    println!(
      "[{}/{}] {}",
      step.progress.asked + 1,
      step.progress.total,
      question.question
    );
    let answer = read_answer(&mut stdin).await?;
    step = client.answer(step.session_id, &question.code, answer).await?;
  }

  print_result(&step);
  Ok(())
}

async fn read_answer(stdin: &mut Lines<BufReader<Stdin>>) -> Result<bool> {
  loop {
    prompt::print_prompt()?;
    let Some(line) = stdin.next_line().await.context("reading answer")? else {
      bail!("input closed before the questionnaire finished");
    };
    match prompt::parse_answer(&line) {
      Some(answer) => return Ok(answer),
      None => println!("Please answer y or n."),
    }
  }
}

fn print_result(step: &StepView) {
  let Some(result) = &step.result else {
    return;
  };

  println!();
  match &result.disease_code {
    Some(code) => {
      let name = result.disease_name.as_deref().unwrap_or(code);
      let confidence = result
        .confidence
        .map(|c| format!(" ({c}%)"))
        .unwrap_or_default();
      println!("Diagnosis: {code} {name}{confidence}");
      if let Some(detail) = result.disease.as_ref().filter(|d| !d.disease.description.is_empty()) {
        println!("{}", detail.disease.description);
      }
    }
    None => println!("No diagnosis."),
  }

  if !result.matched_symptoms.is_empty() {
    println!("\nMatched symptoms:");
    for symptom in &result.matched_symptoms {
      println!("  {} {}", symptom.code, symptom.question);
    }
  }
  if !result.solutions.is_empty() {
    println!("\nRecommendations:");
    for solution in &result.solutions {
      println!("  - {}", solution.text);
    }
  }
  if let Some(note) = &result.note {
    println!("\n{note}");
  }
}
