//! Client-side trivia screen flow
//!
//! `loading -> ready -> question_active -> showing_answer -> ... -> completed`.
//! [`reduce`] is total: an event that does not apply to the current state
//! leaves it unchanged.

use serde::{Deserialize, Serialize};

use crate::scoring::ScoreResult;
use crate::types::PublicTriviaQuestion;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriviaSession {
    pub questions: Vec<PublicTriviaQuestion>,
    pub index: usize,
    pub total_points: u32,
    pub streak: u32,
}

impl TriviaSession {
    pub fn current(&self) -> Option<&PublicTriviaQuestion> {
        self.questions.get(self.index)
    }

    fn is_last(&self) -> bool {
        self.index + 1 >= self.questions.len()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TriviaFlow {
    #[default]
    Loading,
    Failed {
        message: String,
    },
    Ready {
        session: TriviaSession,
    },
    QuestionActive {
        session: TriviaSession,
        selected: Option<usize>,
    },
    ShowingAnswer {
        session: TriviaSession,
        selected: Option<usize>,
        correct_index: usize,
        score: ScoreResult,
    },
    Completed {
        session: TriviaSession,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum TriviaEvent {
    Loaded { questions: Vec<PublicTriviaQuestion> },
    LoadFailed { message: String },
    Start,
    Select { choice_index: usize },
    /// Server verdict for the current question (also sent on timeout, with no selection)
    Revealed { correct_index: usize, score: ScoreResult },
    Next,
    Reset,
}

impl TriviaFlow {
    pub fn name(&self) -> &'static str {
        match self {
            TriviaFlow::Loading => "loading",
            TriviaFlow::Failed { .. } => "failed",
            TriviaFlow::Ready { .. } => "ready",
            TriviaFlow::QuestionActive { .. } => "question_active",
            TriviaFlow::ShowingAnswer { .. } => "showing_answer",
            TriviaFlow::Completed { .. } => "completed",
        }
    }
}

pub fn reduce(state: TriviaFlow, event: TriviaEvent) -> TriviaFlow {
    match (state, event) {
        (_, TriviaEvent::Reset) => TriviaFlow::Loading,

        (TriviaFlow::Loading, TriviaEvent::Loaded { questions }) => {
            let session = TriviaSession {
                questions,
                index: 0,
                total_points: 0,
                streak: 0,
            };
            if session.questions.is_empty() {
                TriviaFlow::Completed { session }
            } else {
                TriviaFlow::Ready { session }
            }
        }

        (TriviaFlow::Loading, TriviaEvent::LoadFailed { message }) => {
            TriviaFlow::Failed { message }
        }

        (TriviaFlow::Ready { session }, TriviaEvent::Start) => TriviaFlow::QuestionActive {
            session,
            selected: None,
        },

        // A choice can be changed until the verdict arrives
        (TriviaFlow::QuestionActive { session, .. }, TriviaEvent::Select { choice_index }) => {
            let in_range = session
                .current()
                .is_some_and(|q| choice_index < q.choices.len());
            TriviaFlow::QuestionActive {
                selected: in_range.then_some(choice_index),
                session,
            }
        }

        (
            TriviaFlow::QuestionActive {
                mut session,
                selected,
            },
            TriviaEvent::Revealed {
                correct_index,
                score,
            },
        ) => {
            session.total_points += score.total_points;
            session.streak = score.new_streak;
            TriviaFlow::ShowingAnswer {
                session,
                selected,
                correct_index,
                score,
            }
        }

        (TriviaFlow::ShowingAnswer { mut session, .. }, TriviaEvent::Next) => {
            if session.is_last() {
                TriviaFlow::Completed { session }
            } else {
                session.index += 1;
                TriviaFlow::QuestionActive {
                    session,
                    selected: None,
                }
            }
        }

        (state, _) => state,
    }
}
