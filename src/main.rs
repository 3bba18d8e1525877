use clap::{Arg, Command};
use fake_email_detector::api::{self, AppState};
use fake_email_detector::classifier::{artifacts, training};
use fake_email_detector::config::ModelConfig;
use fake_email_detector::{AppConfig, EmailSample, Verdict};
use log::LevelFilter;
use std::io::Read;
use std::path::Path;
use std::process;

#[tokio::main]
async fn main() {
    let matches = Command::new("fake-email-detector")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Scores emails for phishing and scam risk")
        .long_about(
            "Fake Email Detector - rates an email's likelihood of being fraudulent.\n\
             Uses a trained text classifier when model artifacts are available and\n\
             falls back to keyword and pattern heuristics otherwise.",
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value(AppConfig::default_path()),
        )
        .arg(
            Arg::new("generate-config")
                .long("generate-config")
                .value_name("FILE")
                .help("Generate a default configuration file")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("test-config")
                .long("test-config")
                .help("Validate the configuration and report the scoring mode")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("analyze")
                .long("analyze")
                .value_name("FILE")
                .help("Analyze an email body read from FILE ('-' for stdin)")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("subject")
                .long("subject")
                .value_name("TEXT")
                .help("Subject line for --analyze")
                .default_value(""),
        )
        .arg(
            Arg::new("sender")
                .long("sender")
                .value_name("ADDRESS")
                .help("Sender address for --analyze")
                .default_value(""),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print the verdict as JSON")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("classify")
                .long("classify")
                .value_name("TEXT")
                .help("Run the trained classifier on TEXT and print SPAM or HAM")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("train")
                .long("train")
                .value_name("FILE")
                .help("Train model artifacts from a JSON dataset (built-in demo data when FILE is omitted)")
                .num_args(0..=1)
                .default_missing_value(""),
        )
        .arg(
            Arg::new("model-dir")
                .long("model-dir")
                .value_name("DIR")
                .help("Directory for trained artifacts (overrides [model] paths)")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("serve")
                .long("serve")
                .help("Start the HTTP API server")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let log_level = if matches.get_flag("verbose") {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    if let Some(generate_path) = matches.get_one::<String>("generate-config") {
        generate_default_config(generate_path);
        return;
    }

    let config_path = matches
        .get_one::<String>("config")
        .map(String::as_str)
        .unwrap_or(AppConfig::default_path());

    let mut config = match AppConfig::load_or_default(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {e:#}");
            process::exit(1);
        }
    };
    config.apply_env_overrides();

    if let Some(dir) = matches.get_one::<String>("model-dir") {
        config.model = ModelConfig::in_dir(Path::new(dir));
    }

    if matches.get_flag("test-config") {
        test_config(&config);
        return;
    }

    if let Some(dataset) = matches.get_one::<String>("train") {
        train_model(&config, dataset);
        return;
    }

    if let Some(text) = matches.get_one::<String>("classify") {
        classify_text(&config, text);
        return;
    }

    if let Some(email_file) = matches.get_one::<String>("analyze") {
        let subject = matches.get_one::<String>("subject").map_or("", String::as_str);
        let sender = matches.get_one::<String>("sender").map_or("", String::as_str);
        analyze_file(&config, email_file, subject, sender, matches.get_flag("json"));
        return;
    }

    if matches.get_flag("serve") {
        if let Err(e) = config.validate() {
            eprintln!("Invalid configuration: {e:#}");
            process::exit(1);
        }

        let state = match AppState::from_config(&config) {
            Ok(state) => state,
            Err(e) => {
                eprintln!("Failed to initialize server: {e:#}");
                process::exit(1);
            }
        };

        if let Err(e) = api::serve(state, &config.server.bind_address).await {
            log::error!("{e:#}");
            process::exit(1);
        }
        return;
    }

    println!("No action given. Use --analyze, --classify, --train or --serve (see --help).");
}

fn generate_default_config(path: &str) {
    let written = AppConfig::default()
        .to_toml()
        .and_then(|content| std::fs::write(path, content).map_err(Into::into));
    match written {
        Ok(()) => {
            println!("Default configuration written to: {path}");
            println!("Please edit the configuration file to suit your needs.");
        }
        Err(e) => {
            eprintln!("Error writing configuration file: {e}");
            process::exit(1);
        }
    }
}

fn test_config(config: &AppConfig) {
    println!("Testing configuration...");
    println!();
    println!("Bind address: {}", config.server.bind_address);
    println!("Database: {}", config.storage.database_path);
    println!(
        "Model artifacts: {} / {} ({})",
        config.model.model_path.display(),
        config.model.vectorizer_path.display(),
        if config.model.enabled { "enabled" } else { "disabled" }
    );
    if let Some(rules) = &config.heuristics.rules_file {
        println!("Heuristic rules: {}", rules.display());
    }

    if let Err(e) = config.validate() {
        println!("❌ Configuration validation failed:");
        println!("Error: {e:#}");
        process::exit(1);
    }

    match config.build_scorer() {
        Ok(scorer) => {
            println!("Scoring mode: {}", scorer.mode().as_str());
            println!("✅ Configuration is valid");
        }
        Err(e) => {
            println!("❌ Failed to build scorer: {e}");
            process::exit(1);
        }
    }
}

fn train_model(config: &AppConfig, dataset: &str) {
    let samples = if dataset.is_empty() {
        println!("Training on the built-in demo dataset");
        training::demo_dataset()
    } else {
        match training::load_dataset(Path::new(dataset)) {
            Ok(samples) => samples,
            Err(e) => {
                eprintln!("❌ {e}");
                process::exit(1);
            }
        }
    };

    let outcome = match training::train(&samples, &training::TrainingOptions::default()) {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("❌ {e}");
            process::exit(1);
        }
    };

    println!(
        "Trained on {} samples, held out {}",
        outcome.train_size, outcome.test_size
    );
    match outcome.accuracy {
        Some(accuracy) => println!("Model Accuracy: {accuracy:.2}%"),
        None => println!("Model Accuracy: n/a (no held-out samples)"),
    }

    if let Err(e) = artifacts::save(
        &outcome.model,
        &config.model.model_path,
        &config.model.vectorizer_path,
    ) {
        eprintln!("❌ {e}");
        process::exit(1);
    }
    println!(
        "Model saved to {} and {}",
        config.model.model_path.display(),
        config.model.vectorizer_path.display()
    );
}

fn classify_text(config: &AppConfig, text: &str) {
    let model = match artifacts::load(&config.model.model_path, &config.model.vectorizer_path) {
        Ok(model) => model,
        Err(e) => {
            eprintln!("❌ {e}");
            eprintln!("Run with --train first to create the model artifacts.");
            process::exit(1);
        }
    };

    match model.predict(text) {
        Ok(prediction) => {
            let label = if prediction.is_spam { "SPAM" } else { "HAM" };
            println!("Prediction: {label}");
            log::debug!("Spam probability: {:.4}", prediction.spam_probability);
        }
        Err(e) => {
            eprintln!("❌ {e}");
            process::exit(1);
        }
    }
}

fn analyze_file(config: &AppConfig, email_file: &str, subject: &str, sender: &str, json: bool) {
    let body = if email_file == "-" {
        let mut body = String::new();
        std::io::stdin()
            .read_to_string(&mut body)
            .map(|_| body)
    } else {
        std::fs::read_to_string(email_file)
    };
    let body = match body {
        Ok(body) => body,
        Err(e) => {
            eprintln!("❌ Error reading email file: {e}");
            process::exit(1);
        }
    };

    if body.trim().is_empty() {
        eprintln!("❌ Email content is required");
        process::exit(1);
    }

    let scorer = match config.build_scorer() {
        Ok(scorer) => scorer,
        Err(e) => {
            eprintln!("❌ {e}");
            process::exit(1);
        }
    };

    let verdict = scorer.predict(&EmailSample::new(body, subject, sender));

    if json {
        match serde_json::to_string_pretty(&verdict) {
            Ok(out) => println!("{out}"),
            Err(e) => {
                eprintln!("❌ {e}");
                process::exit(1);
            }
        }
    } else {
        print_verdict(&verdict, scorer.mode().as_str());
    }
}

fn print_verdict(verdict: &Verdict, mode: &str) {
    println!("Mode: {mode}");
    println!(
        "Result: {}",
        if verdict.is_fake { "🚨 LIKELY FAKE" } else { "✅ Likely legitimate" }
    );
    println!("Confidence: {:.0}%", verdict.confidence * 100.0);
    println!("Threat level: {}", verdict.threat_level);

    if !verdict.indicators.is_empty() {
        println!();
        println!("Indicators:");
        for indicator in &verdict.indicators {
            println!(
                "  [{}] {}: {}",
                indicator.severity.as_str(),
                indicator.indicator_type.as_str(),
                indicator.description
            );
        }
    }

    println!();
    println!("Recommendations:");
    for recommendation in &verdict.recommendations {
        println!("  • {recommendation}");
    }
}
