//! Request handler for sdb-server

use sdb_core::config::SessionConfig;
use sdb_core::expr::Format;
use sdb_core::machine::MachineSnapshot;
use sdb_core::watch::WatchpointId;
use sdb_core::{DebugSession, Request, Response, WatchError};
use tracing::{info, debug, warn};

pub struct Handler {
    session: DebugSession,
}

impl Handler {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            session: DebugSession::new(config),
        }
    }

    pub fn handle(&mut self, request: &Request) -> Response {
        match request {
            Request::Initialize { config } => {
                self.handle_initialize(config)
            }
            Request::Eval { machine, expr, format } => {
                self.handle_eval(machine, expr, *format)
            }
            Request::Examine { machine, expr, count } => {
                self.handle_examine(machine, expr, *count)
            }
            Request::Watch { machine, expr } => {
                self.handle_watch(machine, expr)
            }
            Request::Delete { id } => {
                self.handle_delete(*id)
            }
            Request::Watchpoints => {
                Response::Watchpoints {
                    watchpoints: self.session.watchpoints(),
                }
            }
            Request::Check { machine } => {
                self.handle_check(machine)
            }
            Request::Shutdown => {
                info!("Shutdown requested");
                Response::success()
            }
        }
    }

    fn handle_initialize(&mut self, config: &SessionConfig) -> Response {
        if let Err(e) = config.validate() {
            return Response::failure("config", e.to_string());
        }
        info!("Initializing session: {:?}", config);
        self.session = DebugSession::new(*config);
        Response::success()
    }

    fn handle_eval(&self, machine: &MachineSnapshot, expr: &str, format: Format) -> Response {
        debug!("Eval request: expr={}", expr);

        match self.session.evaluate(expr, machine) {
            Ok(value) => Response::eval_result(value, format),
            Err(e) => Response::failure_at(e.code(), e.to_string(), e.position()),
        }
    }

    fn handle_examine(&self, machine: &MachineSnapshot, expr: &str, count: usize) -> Response {
        debug!("Examine request: count={}, expr={}", count, expr);

        match self.session.examine(count, expr, machine) {
            Ok(words) => Response::Memory { words },
            Err(e) => Response::failure_at(e.code(), e.to_string(), e.position()),
        }
    }

    fn handle_watch(&mut self, machine: &MachineSnapshot, expr: &str) -> Response {
        debug!("Watch request: expr={}", expr);

        match self.session.watch(expr, machine) {
            Ok(wp) => Response::WatchAdded {
                id: wp.id,
                value: wp.value,
            },
            Err(e @ WatchError::PoolExhausted { .. }) => {
                warn!("{}", e);
                Response::failure(e.code(), e.to_string())
            }
            Err(e) => Response::failure_at(e.code(), e.to_string(), e.position()),
        }
    }

    fn handle_delete(&mut self, id: WatchpointId) -> Response {
        debug!("Delete request: id={}", id);

        match self.session.unwatch(id) {
            Ok(()) => Response::success(),
            Err(e) => Response::failure(e.code(), e.to_string()),
        }
    }

    fn handle_check(&mut self, machine: &MachineSnapshot) -> Response {
        match self.session.check_watchpoints(machine) {
            Ok(changes) => {
                for change in &changes {
                    info!("Watchpoint {} changed: {:#x} -> {:#x}", change.id, change.old, change.new);
                }
                Response::changes(changes)
            }
            Err(e) => {
                warn!("Watchpoint check failed: {}", e);
                Response::failure(e.code(), e.to_string())
            }
        }
    }
}
