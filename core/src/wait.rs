//! Polling a remote resource until it settles into a target state.
//!
//! Each connector supplies a refresh function that reads the resource once and
//! reports its state as a string; `wait_for_state` drives it with a growing
//! poll interval until the state lands in `target`, leaves `pending`, or the
//! timeout expires.

use std::{future::Future, time::Duration};

use tokio::time::{Instant, sleep};

/// One observation of a resource: `None` when it does not exist, otherwise the
/// resource and its state.
pub type Refreshed<T> = Option<(T, String)>;

const MAX_POLL_INTERVAL: Duration = Duration::from_secs(10);
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, thiserror::Error)]
pub enum WaitError {
    #[error("timeout after {timeout:?} waiting for state to become {expected:?} (last state: {last_state:?})")]
    Timeout {
        last_state: Option<String>,
        expected:   Vec<String>,
        timeout:    Duration,
    },
    #[error("unexpected state `{state}`, wanted one of {expected:?}")]
    UnexpectedState { state: String, expected: Vec<String> },
    #[error("resource not found after {checks} consecutive checks")]
    NotFound { checks: u32 },
    #[error(transparent)]
    Refresh(#[from] anyhow::Error),
}

#[derive(Debug, Clone)]
pub struct StateChangeConf {
    pub pending: Vec<String>,
    /// An empty target means "wait until the resource is gone".
    pub target: Vec<String>,
    pub timeout: Duration,
    /// Sleep before the first refresh.
    pub delay: Duration,
    /// Initial poll interval; doubles after every pending observation, capped at 10s.
    pub min_timeout: Duration,
    pub not_found_checks: u32,
}

impl Default for StateChangeConf {
    fn default() -> Self {
        Self {
            pending: Vec::new(),
            target: Vec::new(),
            timeout: Duration::from_secs(5 * 60),
            delay: Duration::ZERO,
            min_timeout: Duration::from_secs(2),
            not_found_checks: 20,
        }
    }
}

impl StateChangeConf {
    pub fn new(pending: &[&str], target: &[&str], timeout: Duration) -> Self {
        Self {
            pending: pending.iter().map(|s| s.to_string()).collect(),
            target: target.iter().map(|s| s.to_string()).collect(),
            timeout,
            ..Default::default()
        }
    }
}

/// Calls `refresh` until the observed state is in `conf.target`.
///
/// Returns `Ok(None)` when the target is empty and the resource is gone,
/// `Ok(Some(resource))` once a target state is reached.
pub async fn wait_for_state<T, F, Fut>(conf: &StateChangeConf, mut refresh: F) -> Result<Option<T>, WaitError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = anyhow::Result<Refreshed<T>>>,
{
    let start = Instant::now();
    let mut interval = conf.min_timeout.max(MIN_POLL_INTERVAL);
    let mut not_found = 0u32;
    let mut last_state: Option<String> = None;

    if !conf.delay.is_zero() {
        sleep(conf.delay).await;
    }

    loop {
        match refresh().await? {
            None if conf.target.is_empty() => {
                tracing::debug!("resource is gone after {:?}", start.elapsed());
                return Ok(None);
            }
            None => {
                not_found += 1;
                if not_found > conf.not_found_checks {
                    return Err(WaitError::NotFound { checks: not_found - 1 });
                }
                tracing::debug!("resource not found yet ({}/{})", not_found, conf.not_found_checks);
            }
            Some((value, state)) => {
                not_found = 0;

                if conf.target.contains(&state) {
                    tracing::debug!("reached state {} after {:?}", state, start.elapsed());
                    return Ok(Some(value));
                }

                if !conf.pending.contains(&state) {
                    return Err(WaitError::UnexpectedState {
                        state,
                        expected: conf.target.clone(),
                    });
                }

                tracing::debug!("waiting on state {} (target {:?})", state, conf.target);
                last_state = Some(state);
            }
        }

        let elapsed = start.elapsed();
        if elapsed >= conf.timeout {
            return Err(WaitError::Timeout {
                last_state,
                expected: conf.target.clone(),
                timeout: conf.timeout,
            });
        }

        sleep(interval.min(conf.timeout - elapsed)).await;
        interval = (interval * 2).min(MAX_POLL_INTERVAL);
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::VecDeque, sync::Mutex};

    use anyhow::anyhow;

    use super::*;

    /// Replays a fixed sequence of observations, repeating the last one forever.
    fn script(states: &[Option<&str>]) -> impl FnMut() -> std::future::Ready<anyhow::Result<Refreshed<u32>>> {
        let queue = Mutex::new(
            states
                .iter()
                .enumerate()
                .map(|(i, s)| s.map(|s| (i as u32, s.to_string())))
                .collect::<VecDeque<_>>(),
        );

        move || {
            let mut queue = queue.lock().unwrap();
            let next = if queue.len() > 1 {
                queue.pop_front().unwrap()
            } else {
                queue.front().cloned().unwrap()
            };
            std::future::ready(Ok(next))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn reaches_target_through_pending() {
        let conf = StateChangeConf::new(&["requested", "pending"], &["available"], Duration::from_secs(60));

        let result = wait_for_state(&conf, script(&[Some("requested"), Some("pending"), Some("available")]))
            .await
            .unwrap();

        assert_eq!(result, Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn empty_target_succeeds_when_gone() {
        let conf = StateChangeConf::new(&["available", "deleting"], &[], Duration::from_secs(60));

        let result = wait_for_state(&conf, script(&[Some("available"), Some("deleting"), None]))
            .await
            .unwrap();

        assert_eq!(result, None);
    }

    #[tokio::test(start_paused = true)]
    async fn unexpected_state_fails_fast() {
        let conf = StateChangeConf::new(&["DEPLOYING"], &["SUCCEEDED"], Duration::from_secs(60));

        let err = wait_for_state(&conf, script(&[Some("DEPLOYING"), Some("FAILED")]))
            .await
            .unwrap_err();

        match err {
            WaitError::UnexpectedState { state, expected } => {
                assert_eq!(state, "FAILED");
                assert_eq!(expected, vec![String::from("SUCCEEDED")]);
            }
            other => panic!("expected UnexpectedState, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn times_out_while_pending() {
        let conf = StateChangeConf::new(&["deleting"], &[], Duration::from_secs(30));

        let err = wait_for_state(&conf, script(&[Some("deleting")])).await.unwrap_err();

        match err {
            WaitError::Timeout { last_state, timeout, .. } => {
                assert_eq!(last_state.as_deref(), Some("deleting"));
                assert_eq!(timeout, Duration::from_secs(30));
            }
            other => panic!("expected Timeout, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_not_found_checks() {
        let conf = StateChangeConf {
            not_found_checks: 3,
            ..StateChangeConf::new(&["INITIALIZING"], &["SUCCEEDED"], Duration::from_secs(600))
        };

        let err = wait_for_state(&conf, script(&[None])).await.unwrap_err();

        assert!(matches!(err, WaitError::NotFound { checks: 3 }));
    }

    #[tokio::test(start_paused = true)]
    async fn not_found_counter_resets_when_seen() {
        let conf = StateChangeConf {
            not_found_checks: 1,
            ..StateChangeConf::new(&["INITIALIZING"], &["SUCCEEDED"], Duration::from_secs(600))
        };

        let result = wait_for_state(
            &conf,
            script(&[None, Some("INITIALIZING"), None, Some("SUCCEEDED")]),
        )
        .await
        .unwrap();

        assert_eq!(result, Some(3));
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_errors_propagate() {
        let conf = StateChangeConf::new(&["pending"], &["available"], Duration::from_secs(60));

        let err = wait_for_state(&conf, || async { Err::<Refreshed<()>, _>(anyhow!("throttled")) })
            .await
            .unwrap_err();

        assert!(matches!(err, WaitError::Refresh(_)));
        assert_eq!(err.to_string(), "throttled");
    }

    #[tokio::test(start_paused = true)]
    async fn honours_initial_delay() {
        let conf = StateChangeConf {
            delay: Duration::from_secs(5),
            ..StateChangeConf::new(&[], &["available"], Duration::from_secs(60))
        };
        let start = Instant::now();

        wait_for_state(&conf, script(&[Some("available")])).await.unwrap();

        assert!(start.elapsed() >= Duration::from_secs(5));
    }
}
