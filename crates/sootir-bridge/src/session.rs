//! Bridge session.
//!
//! Holds at most one lifter instance, created by `__init__`, and answers
//! requests until `__exit` or end of input. A failing operation is answered
//! with a `failed` frame and never ends the session, so the peer does not
//! have to rebuild the instance after every error.
//!
//! # Example
//!
//! ```rust,ignore
//! use sootir_bridge::Session;
//!
//! let stdin = std::io::stdin();
//! Session::new().serve(stdin.lock(), std::io::stdout())?;
//! ```

use std::io::{BufRead, Write};
use std::path::Path;

use serde_json::Value;
use sootir::{ClassMap, Hierarchy, Lifter, LifterConfig, PrettyPrint, Program};
use tracing::{debug, warn};

use crate::error::BridgeError;
use crate::protocol::{self, Frame, Request};

/// The lifted program an `__init__` produced
struct Instance {
    classes: ClassMap,
    hierarchy: Hierarchy,
}

#[derive(Default)]
pub struct Session {
    instance: Option<Instance>,
    closed: bool,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `__exit` has been received
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Answer requests read from `reader` until `__exit` or end of input.
    ///
    /// Only transport failures are returned as errors.
    pub fn serve(&mut self, mut reader: impl BufRead, mut writer: impl Write) -> Result<(), BridgeError> {
        while !self.closed {
            let Some(line) = protocol::read_line(&mut reader)? else {
                break;
            };
            let request: Request = serde_json::from_str(&line)?;
            for frame in self.handle(&request) {
                protocol::write_frame(&mut writer, &frame)?;
            }
        }
        Ok(())
    }

    /// Answer one request with the frames to send back
    pub fn handle(&mut self, request: &Request) -> Vec<Frame> {
        debug!(op = %request.op, args = request.args.len(), "bridge request");
        match request.op.as_str() {
            "__exit" => {
                self.closed = true;
                vec![Frame::ack()]
            }
            "__init__" => match self.init(request) {
                Ok(()) => vec![Frame::ack()],
                Err(err) => failed(request, err),
            },
            _ => match self.call(request).and_then(|result| respond(request, result)) {
                Ok(frames) => frames,
                Err(err) => failed(request, err),
            },
        }
    }

    fn init(&mut self, request: &Request) -> Result<(), BridgeError> {
        let config = match request.kwargs.get("config") {
            Some(value) => serde_json::from_value::<LifterConfig>(value.clone())?,
            None => LifterConfig::default(),
        };
        let program_path = request
            .string_arg(0, "program")
            .ok_or_else(|| BridgeError::MissingArgument {
                op: request.op.clone(),
                name: "program",
            })?;

        // Replace any previous instance only once the new one is complete
        let lifter = Lifter::new(config)?;
        let program = Program::from_file(Path::new(program_path))?;
        let classes = lifter.lift(&program)?;
        let hierarchy = lifter.hierarchy(&program);
        self.instance = Some(Instance { classes, hierarchy });
        Ok(())
    }

    fn call(&self, request: &Request) -> Result<Value, BridgeError> {
        let instance = self.instance.as_ref().ok_or(BridgeError::NoInstance)?;
        let name = || {
            request
                .string_arg(0, "name")
                .ok_or_else(|| BridgeError::MissingArgument {
                    op: request.op.clone(),
                    name: "name",
                })
        };

        match request.op.as_str() {
            "get_classes" => Ok(serde_json::to_value(&instance.classes)?),
            "subclasses_of" => {
                let subclasses = instance.hierarchy.subclasses_of(name()?)?;
                Ok(Value::from(subclasses))
            }
            "render_class" => {
                let name = name()?;
                let class = instance
                    .classes
                    .get(name)
                    .ok_or_else(|| sootir::LiftError::UnknownClass {
                        name: name.to_string(),
                    })?;
                Ok(Value::String(class.pretty_print()))
            }
            _ => Err(BridgeError::UnknownOp {
                op: request.op.clone(),
            }),
        }
    }
}

/// Shape a successful result according to the transport options
fn respond(request: &Request, result: Value) -> Result<Vec<Frame>, BridgeError> {
    let options = &request.options;

    if let Some(path) = &options.save_pickle {
        let serialized = serde_json::to_string(&result)?;
        std::fs::write(path, &serialized)?;
        let frame = if options.sends_back() {
            Frame::Unit {
                result: None,
                serialized: Some(serialized),
            }
        } else {
            Frame::ack()
        };
        return Ok(vec![frame]);
    }

    if !options.sends_back() {
        return Ok(vec![Frame::ack()]);
    }

    if options.split_results > 0 && !options.return_pickle {
        if let Some(frames) = protocol::split_frames(&result, options.split_results) {
            return Ok(frames);
        }
    }

    let serialized = if options.return_pickle {
        Some(serde_json::to_string(&result)?)
    } else {
        None
    };
    Ok(vec![Frame::Unit {
        result: options.return_result.then_some(result),
        serialized,
    }])
}

fn failed(request: &Request, err: BridgeError) -> Vec<Frame> {
    warn!(op = %request.op, error = %err, "bridge operation failed");
    vec![Frame::Failed {
        op: request.op.clone(),
        message: err.to_string(),
    }]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::TransportOptions;
    use serde_json::json;

    #[test]
    fn test_call_before_init() {
        let mut session = Session::new();
        let frames = session.handle(&Request::new("get_classes"));
        assert_eq!(
            frames,
            vec![Frame::Failed {
                op: "get_classes".to_string(),
                message: BridgeError::NoInstance.to_string(),
            }]
        );
        assert!(!session.is_closed());
    }

    #[test]
    fn test_exit_closes() {
        let mut session = Session::new();
        assert_eq!(session.handle(&Request::new("__exit")), vec![Frame::ack()]);
        assert!(session.is_closed());
    }

    #[test]
    fn test_init_without_program() {
        let mut session = Session::new();
        let frames = session.handle(&Request::new("__init__"));
        assert!(frames[0].is_failed());
    }

    #[test]
    fn test_respond_options() {
        let request = Request::new("x");
        assert_eq!(
            respond(&request, json!([1])).unwrap(),
            vec![Frame::Unit {
                result: Some(json!([1])),
                serialized: None
            }]
        );

        let quiet = Request::new("x").options(TransportOptions {
            return_result: false,
            ..Default::default()
        });
        assert_eq!(respond(&quiet, json!([1])).unwrap(), vec![Frame::ack()]);

        let pickled = Request::new("x").options(TransportOptions {
            return_result: false,
            return_pickle: true,
            split_results: 4,
            ..Default::default()
        });
        assert_eq!(
            respond(&pickled, json!([1, 2])).unwrap(),
            vec![Frame::Unit {
                result: None,
                serialized: Some("[1,2]".to_string())
            }]
        );
    }

    #[test]
    fn test_split_scalar_is_unit() {
        let request = Request::new("x").options(TransportOptions {
            split_results: 2,
            ..Default::default()
        });
        let frames = respond(&request, json!("text")).unwrap();
        assert_eq!(frames.len(), 1);
    }
}
