//! The interactive read, dispatch, wait, print cycle.

use std::io::{self, Write};

use tokio::io::AsyncBufRead;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::answer::{latest_answer, print_answer};
use crate::api::AssistantApi;
use crate::dispatch::dispatch;
use crate::input::InputReader;
use crate::poller::{wait_for_run, Completed, PollError, PollPolicy};
use crate::session::Session;

pub const GREETING: &str = "hi Peter, what is your question?";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Turn {
    Answered,
    Failed,
    Cancelled,
}

pub struct ChatLoop<A> {
    api: A,
    session: Session,
    policy: PollPolicy,
    cancel: CancellationToken,
}

impl<A: AssistantApi> ChatLoop<A> {
    pub fn new(api: A, session: Session, policy: PollPolicy, cancel: CancellationToken) -> Self {
        Self {
            api,
            session,
            policy,
            cancel,
        }
    }

    /// Runs until end of input or cancellation. A failed question is
    /// reported and the loop moves on to the next one.
    pub async fn run<R, W>(&self, input: &mut InputReader<R>, out: &mut W) -> io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        writeln!(out, "{GREETING}")?;
        out.flush()?;

        let mut asked = 0usize;
        loop {
            let line = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                line = input.next_line() => line?,
            };
            let Some(question) = line else {
                break;
            };

            asked += 1;
            if self.ask(&question, out).await? == Turn::Cancelled {
                break;
            }
        }

        info!(questions = asked, "chat loop finished");
        Ok(())
    }

    async fn ask<W: Write>(&self, question: &str, out: &mut W) -> io::Result<Turn> {
        writeln!(out, "processing...")?;
        out.flush()?;

        let turn = match self.answer(question).await {
            Ok((done, answer)) => {
                writeln!(
                    out,
                    "execution time: {:.2} seconds",
                    done.elapsed.as_secs_f64()
                )?;
                print_answer(out, answer.as_deref())?;
                Turn::Answered
            }
            Err(PollError::Cancelled) => Turn::Cancelled,
            Err(err) => {
                error!(error = %err, "question failed");
                writeln!(out, "error: {err}")?;
                Turn::Failed
            }
        };
        out.flush()?;
        Ok(turn)
    }

    /// The poller stops itself on cancellation (and cancels the remote run);
    /// the requests around it are dropped when the token fires.
    async fn answer(&self, question: &str) -> Result<(Completed, Option<String>), PollError> {
        let thread_id = &self.session.thread.id;
        let dispatched = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Err(PollError::Cancelled),
            dispatched = dispatch(&self.api, &self.session, question) => dispatched?,
        };
        let done = wait_for_run(
            &self.api,
            thread_id,
            &dispatched.run.id,
            &self.policy,
            &self.cancel,
        )
        .await?;
        let answer = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Err(PollError::Cancelled),
            answer = latest_answer(&self.api, thread_id) => answer?,
        };
        Ok((done, answer))
    }
}
