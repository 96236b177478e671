//! Command implementations.
//!
//! Every argument is validated before any token is probed; a bad prefix,
//! window, proxy or host ends the command without side effects.

use std::{io::Write, num::NonZeroUsize, sync::Arc};

use forge_core::{
    CollisionOracle, EngineConfig, ForgeError, GeneratedSource, JsonSink, LogProgress, NullSource,
    ProbeEngine, RecordSink, StaticSource, SystemEnv, Token, TokenGenerator, TokenSource, lines,
    output::to_pretty_json,
    prefix::require_valid_prefix,
    remote::{
        GithubClientFactory, IP_CHECK_URLS, ProxyConfig, RemoteConfig, RemoteValidationOracle,
        check_public_ip, http_client,
    },
};
use tokio::sync::watch;

use crate::{
    args::{Command, DisectArgs, Globals, LocalArgs, LoginArgs, ProxyArgs, SourceArgs, TokenParams},
    error::CliError,
};

/// Runs one command. Token text goes to `out`; logs go to stderr.
pub async fn run(
    command: Command,
    globals: &Globals,
    out: &mut dyn Write,
    shutdown: watch::Receiver<bool>,
) -> Result<(), CliError> {
    match command {
        Command::Version => version(out),
        Command::Generate(params) => generate(&params, out),
        Command::Disect(args) => disect(&args, out),
        Command::Login(args) => login(args, globals, shutdown).await,
        Command::Local(args) => local(&args, globals, shutdown).await,
        Command::IpCheck(args) => ip_check(&args, shutdown).await,
    }
}

/// Raises the returned signal on Ctrl-C.
pub fn interrupt_signal() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::warn!("interrupt received; finishing in-flight work");
                let _ = tx.send(true);
            },
            Err(e) => tracing::error!("failed to listen for interrupts: {}", e),
        }
    });
    rx
}

fn version(out: &mut dyn Write) -> Result<(), CliError> {
    writeln!(out, "Version: {}", env!("CARGO_PKG_VERSION"))?;
    Ok(())
}

fn generate(params: &TokenParams, out: &mut dyn Write) -> Result<(), CliError> {
    require_valid_prefix(&params.prefix)?;

    let generator = TokenGenerator::new(SystemEnv::new(), params.prefix.as_str());
    for _ in 0..params.num_tokens {
        writeln!(out, "{}", generator.generate())?;
    }
    Ok(())
}

fn disect(args: &DisectArgs, out: &mut dyn Write) -> Result<(), CliError> {
    let SourceArgs { token, file, generated, no_auth } = &args.source;

    if let Some(text) = token {
        print_token(Token::parse(text), out)?;
    } else if let Some(path) = file {
        for line in lines::read_lines(path)? {
            print_token(Token::parse(&line), out)?;
        }
    } else if *generated {
        require_valid_prefix(&args.params.prefix)?;
        let generator = TokenGenerator::new(SystemEnv::new(), args.params.prefix.as_str());
        for _ in 0..args.params.num_tokens {
            print_token(generator.generate(), out)?;
        }
    } else if *no_auth {
        tracing::warn!("the no-auth flag has no effect in this mode, there's no token to inspect!");
    }
    Ok(())
}

fn print_token(mut token: Token, out: &mut dyn Write) -> Result<(), CliError> {
    token.validate_schema();
    out.write_all(&to_pretty_json(&token)?)?;
    writeln!(out)?;
    Ok(())
}

fn window(batch_size: usize) -> Result<NonZeroUsize, ForgeError> {
    NonZeroUsize::new(batch_size).ok_or(ForgeError::InvalidWindow)
}

/// Picks the token source named on the command line.
fn token_source(source: &SourceArgs, params: &TokenParams) -> Result<Box<dyn TokenSource>, ForgeError> {
    if source.no_auth {
        return Ok(Box::new(NullSource::new(params.num_tokens)));
    }
    if source.generated {
        require_valid_prefix(&params.prefix)?;
        let generator = TokenGenerator::new(SystemEnv::new(), params.prefix.as_str());
        return Ok(Box::new(GeneratedSource::from_generator(generator, params.num_tokens)));
    }
    if let Some(path) = &source.file {
        return Ok(Box::new(StaticSource::from_file(path, params.num_tokens)?));
    }

    let text = source.token.as_deref().unwrap_or_default();
    let token = Token::parse(text);
    if token.is_malformed() {
        return Err(ForgeError::MalformedToken { text: text.to_string() });
    }
    Ok(Box::new(StaticSource::single(token)))
}

async fn login(args: LoginArgs, globals: &Globals, shutdown: watch::Receiver<bool>) -> Result<(), CliError> {
    let proxy = ProxyConfig::parse(&args.proxy.proxy)?;
    let window = window(args.window.batch_size)?;
    let config = RemoteConfig { host: args.host, proxy, force_check: args.force_check, ..RemoteConfig::default() };
    let factory = GithubClientFactory::new(&config)?;
    let source = token_source(&args.source, &args.params)?;

    let sink: Arc<dyn RecordSink> = Arc::new(JsonSink::stdout());
    let oracle = Arc::new(RemoteValidationOracle::new(factory, config.force_check, sink));
    let engine = ProbeEngine::new(EngineConfig { window, verbose: globals.debug });
    let progress = LogProgress::new(source.remaining());

    let report = engine.run(source.as_ref(), Arc::clone(&oracle), &progress, Some(shutdown)).await;
    tracing::info!(
        processed = report.processed,
        flagged = report.flagged_count(),
        failed_tasks = report.failed_tasks,
        "login test finished"
    );

    if report.interrupted {
        tracing::warn!("interrupted; skipping follow-up on {} flagged tokens", report.flagged_count());
        return Ok(());
    }
    oracle.enrich(&SystemEnv::new(), &report.flagged).await;
    Ok(())
}

async fn local(args: &LocalArgs, globals: &Globals, shutdown: watch::Receiver<bool>) -> Result<(), CliError> {
    require_valid_prefix(&args.params.prefix)?;
    let window = window(args.window.batch_size)?;

    let generator = TokenGenerator::new(SystemEnv::new(), args.params.prefix.as_str());
    let oracle = Arc::new(CollisionOracle::new());
    tracing::info!("loading {} tokens...", args.num_tests);
    oracle.preload(args.num_tests, || generator.generate());

    let source = GeneratedSource::from_generator(generator, args.params.num_tokens);
    let engine = ProbeEngine::new(EngineConfig { window, verbose: globals.debug });
    let progress = LogProgress::new(source.remaining());

    let report = engine.run(&source, oracle, &progress, Some(shutdown)).await;
    tracing::info!("test complete with {} collisions", report.flagged_count());
    Ok(())
}

async fn ip_check(args: &ProxyArgs, mut shutdown: watch::Receiver<bool>) -> Result<(), CliError> {
    let proxy = ProxyConfig::parse(&args.proxy)?;
    let http = http_client(&RemoteConfig { proxy, ..RemoteConfig::default() })?;

    tokio::select! {
        answers = check_public_ip(&http, &IP_CHECK_URLS) => {
            tracing::info!("{} of {} services answered", answers.len(), IP_CHECK_URLS.len());
        },
        Ok(_) = shutdown.wait_for(|raised| *raised) => {
            tracing::warn!("interrupted; abandoning ip check");
        },
    }
    Ok(())
}
