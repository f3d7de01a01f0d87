use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use anyhow::Context;
use ezd_logging::{ezd_debug, ezd_info, ezd_warn};
use ezdiffusion_client::ensure_state_dir;
use ezdiffusion_core::{update, AppState, Msg};

use super::config::AppConfig;
use super::console::{self, Command};
use super::effects::EffectRunner;
use super::logging;
use super::persistence::load_preferences;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

pub fn run_app() -> anyhow::Result<()> {
    let config = AppConfig::from_env();
    logging::initialize(config.log_destination, config.log_level);
    for warning in &config.warnings {
        ezd_warn!("{}", warning);
    }

    ensure_state_dir(&config.state_dir)
        .with_context(|| format!("state directory {:?} is unusable", config.state_dir))?;

    let (msg_tx, msg_rx) = mpsc::channel::<Msg>();
    let runner = EffectRunner::new(config.api.clone(), config.state_dir.clone(), msg_tx)
        .context("failed to start the generation engine")?;

    let mut state = AppState::new();
    if let Some(prefs) = load_preferences(&config.state_dir) {
        state = dispatch(state, Msg::RestorePreferences(prefs), &runner);
    }
    state.consume_dirty();

    let line_rx = spawn_stdin_reader();
    println!("{}", console::render(&state.view()));
    print_prompt();

    let mut stdin_open = true;
    loop {
        if stdin_open {
            match line_rx.recv_timeout(POLL_INTERVAL) {
                Ok(line) => match console::interpret(&line, &state) {
                    Ok(Command::Quit) => break,
                    Ok(Command::Help) => println!("{}", console::HELP),
                    Ok(Command::Show) => println!("{}", console::render(&state.view())),
                    Ok(Command::Dispatch(msgs)) => {
                        for msg in msgs {
                            state = dispatch(state, msg, &runner);
                        }
                    }
                    Err(hint) => println!("{hint}"),
                },
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    ezd_debug!("stdin closed");
                    stdin_open = false;
                }
            }
        } else if !has_pending_work(&state) {
            break;
        } else {
            thread::sleep(POLL_INTERVAL);
        }

        while let Ok(msg) = msg_rx.try_recv() {
            state = dispatch(state, msg, &runner);
        }
        for msg in runner.drain_events() {
            state = dispatch(state, msg, &runner);
        }

        if state.consume_dirty() {
            println!("{}", console::render(&state.view()));
            print_prompt();
        }
    }

    ezd_info!("ezdiffusion console exiting");
    Ok(())
}

/// Piped input may run out while requests are still outstanding; the loop
/// keeps draining engine events until none remain.
fn has_pending_work(state: &AppState) -> bool {
    state.generations_in_flight() > 0 || state.ui().is_loading
}

fn dispatch(state: AppState, msg: Msg, runner: &EffectRunner) -> AppState {
    let (state, effects) = update(state, msg);
    runner.enqueue(effects);
    state
}

fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (line_tx, line_rx) = mpsc::channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if line_tx.send(line).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    ezd_warn!("Failed to read stdin: {}", err);
                    break;
                }
            }
        }
    });
    line_rx
}

fn print_prompt() {
    let mut stdout = io::stdout();
    let _ = write!(stdout, "> ");
    let _ = stdout.flush();
}

#[cfg(test)]
mod tests {
    use ezdiffusion_core::{GenerationCompletion, ParamsMsg};

    use super::*;

    fn apply(state: AppState, msgs: Vec<Msg>) -> AppState {
        msgs.into_iter().fold(state, |state, msg| update(state, msg).0)
    }

    #[test]
    fn waits_for_every_overlapping_generation() {
        let state = apply(
            AppState::new(),
            vec![
                Msg::Params(ParamsMsg::SetPrompt("a cat".to_string())),
                Msg::GenerateClicked,
                Msg::GenerateClicked,
            ],
        );
        let first_input = state.params().clone();
        let state = apply(
            state,
            vec![Msg::GenerationCompleted {
                input: first_input,
                completion: GenerationCompletion::Failed {
                    message: "connection refused".to_string(),
                },
            }],
        );
        assert!(has_pending_work(&state));

        let second_input = state.params().clone();
        let state = apply(
            state,
            vec![Msg::GenerationCompleted {
                input: second_input,
                completion: GenerationCompletion::Accepted,
            }],
        );
        assert!(!has_pending_work(&state));
    }

    #[test]
    fn waits_for_history_and_memory_requests() {
        let state = apply(AppState::new(), vec![Msg::RefreshHistoryClicked]);
        assert!(has_pending_work(&state));
        let state = apply(state, vec![Msg::HistoryLoaded(Vec::new())]);
        assert!(!has_pending_work(&state));

        let state = apply(state, vec![Msg::MemoryInfoClicked]);
        assert!(has_pending_work(&state));
        let state = apply(state, vec![Msg::MemoryInfoLoaded("device=cpu".to_string())]);
        assert!(!has_pending_work(&state));
    }
}
