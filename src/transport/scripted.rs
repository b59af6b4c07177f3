//! Scripted in-memory channel for driver tests
//!
//! Records every command and answers from a table of canned outputs keyed
//! by command prefix. The most recently added matching entry wins.

use crate::domain::ports::{CommandOutput, RemoteCommandChannel};
use crate::error::{Error, Result};
use crate::driver::orchestrator::CLONE_STARTED;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

enum Reply {
    Output(CommandOutput),
    TransportFailure(String),
}

pub struct ScriptedChannel {
    replies: Mutex<Vec<(String, Reply)>>,
    commands: Mutex<Vec<String>>,
}

impl ScriptedChannel {
    /// Channel answering every command with empty output
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(Vec::new()),
            commands: Mutex::new(Vec::new()),
        })
    }

    /// Channel behaving like a healthy filer
    pub fn netapp() -> Arc<Self> {
        Self::new()
            .respond("clone start", CommandOutput::new(CLONE_STARTED, ""))
            .respond(
                "iscsi nodename",
                CommandOutput::new("iSCSI target nodename: iqn.1992-08.com.netapp:sn.84167939\n", ""),
            )
    }

    pub fn respond(self: Arc<Self>, prefix: &str, output: CommandOutput) -> Arc<Self> {
        self.replies
            .lock()
            .unwrap()
            .push((prefix.to_string(), Reply::Output(output)));
        self
    }

    /// Fail commands starting with `prefix` at the transport level
    pub fn fail(self: Arc<Self>, prefix: &str, reason: &str) -> Arc<Self> {
        self.replies
            .lock()
            .unwrap()
            .push((prefix.to_string(), Reply::TransportFailure(reason.to_string())));
        self
    }

    /// Commands issued so far, in order
    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }
}

#[async_trait]
impl RemoteCommandChannel for ScriptedChannel {
    async fn execute(&self, command: &str) -> Result<CommandOutput> {
        self.commands.lock().unwrap().push(command.to_string());

        let replies = self.replies.lock().unwrap();
        match replies
            .iter()
            .rev()
            .find(|(prefix, _)| command.starts_with(prefix.as_str()))
        {
            Some((_, Reply::Output(output))) => Ok(output.clone()),
            Some((_, Reply::TransportFailure(reason))) => Err(Error::Transport {
                endpoint: self.endpoint(),
                reason: reason.clone(),
            }),
            None => Ok(CommandOutput::empty()),
        }
    }

    fn endpoint(&self) -> String {
        "scripted".to_string()
    }
}
