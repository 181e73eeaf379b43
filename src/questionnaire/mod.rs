//! Fixed linear trip questionnaire
//!
//! Each service has an ordered list of questions. A [`Questionnaire`] is an
//! explicit state value: it records the answers given so far, skips questions
//! whose condition does not hold, and yields a [`Summary`] once every visible
//! question is answered. Question text is a message key for the
//! [`Translator`](crate::locale::Translator).

use crate::error::{RahalahError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Service a questionnaire collects details for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Service {
    Flights,
    Hotels,
    Cars,
}

impl Service {
    pub fn as_str(&self) -> &'static str {
        match self {
            Service::Flights => "flights",
            Service::Hotels => "hotels",
            Service::Cars => "cars",
        }
    }

    /// Ordered questions for this service
    pub fn questions(&self) -> &'static [Question] {
        match self {
            Service::Flights => FLIGHT_QUESTIONS,
            Service::Hotels => HOTEL_QUESTIONS,
            Service::Cars => CAR_QUESTIONS,
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Service {
    type Err = RahalahError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "flights" => Ok(Service::Flights),
            "hotels" => Ok(Service::Hotels),
            "cars" => Ok(Service::Cars),
            other => Err(RahalahError::Questionnaire(format!(
                "Unknown service '{}'",
                other
            ))),
        }
    }
}

/// Shows a question only when an earlier answer has a given value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Condition {
    pub key: &'static str,
    pub equals: &'static str,
}

impl Condition {
    fn holds(&self, answers: &BTreeMap<String, String>) -> bool {
        answers.get(self.key).map(String::as_str) == Some(self.equals)
    }
}

/// One questionnaire step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Question {
    /// Answer key in the summary
    pub key: &'static str,
    /// Translation key of the question text
    pub message: &'static str,
    /// Allowed answers; empty means free text
    pub options: &'static [&'static str],
    pub condition: Option<Condition>,
}

impl Question {
    const fn free(key: &'static str, message: &'static str) -> Self {
        Self {
            key,
            message,
            options: &[],
            condition: None,
        }
    }

    const fn choice(
        key: &'static str,
        message: &'static str,
        options: &'static [&'static str],
    ) -> Self {
        Self {
            key,
            message,
            options,
            condition: None,
        }
    }

    fn is_visible(&self, answers: &BTreeMap<String, String>) -> bool {
        self.condition.map_or(true, |c| c.holds(answers))
    }

    /// Canonical answer: an option by 1-based number or case-insensitive text
    fn accept(&self, response: &str) -> Option<String> {
        let response = response.trim();
        if self.options.is_empty() {
            return Some(response.to_string());
        }

        if let Ok(n) = response.parse::<usize>() {
            return n
                .checked_sub(1)
                .and_then(|idx| self.options.get(idx))
                .map(|o| o.to_string());
        }

        self.options
            .iter()
            .find(|o| o.eq_ignore_ascii_case(response))
            .map(|o| o.to_string())
    }
}

const ROUND_TRIP: &str = "Round trip";

const FLIGHT_QUESTIONS: &[Question] = &[
    Question::free("origin", "q_flight_origin"),
    Question::free("destination", "q_flight_destination"),
    Question::free("departDate", "q_flight_depart_date"),
    Question::choice("tripType", "q_flight_trip_type", &["One-way", ROUND_TRIP]),
    Question {
        key: "returnDate",
        message: "q_flight_return_date",
        options: &[],
        condition: Some(Condition {
            key: "tripType",
            equals: ROUND_TRIP,
        }),
    },
    Question::free("travelers", "q_flight_travelers"),
];

const HOTEL_QUESTIONS: &[Question] = &[
    Question::free("city", "q_hotel_city"),
    Question::free("checkIn", "q_hotel_check_in"),
    Question::free("checkOut", "q_hotel_check_out"),
    Question::free("guests", "q_hotel_guests"),
    Question::choice(
        "amenities",
        "q_hotel_amenities",
        &["Pool", "Gym", "Free breakfast", "Free WiFi", "No preference"],
    ),
    Question::choice("budget", "q_hotel_budget", &["Budget", "Mid-range", "Luxury"]),
];

const CAR_QUESTIONS: &[Question] = &[
    Question::free("city", "q_car_city"),
    Question::free("pickupDate", "q_car_pickup_date"),
    Question::free("returnDate", "q_car_return_date"),
    Question::choice(
        "carType",
        "q_car_type",
        &["Economy", "Mid-size", "SUV", "Luxury", "Sports"],
    ),
    Question::free("company", "q_car_company"),
];

/// The question to ask next
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Prompt {
    pub key: &'static str,
    pub message: &'static str,
    pub options: &'static [&'static str],
    /// 1-based position among the visible questions
    pub step: usize,
    pub total_steps: usize,
    pub is_last_step: bool,
}

/// Collected answers of a completed questionnaire
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub service: Service,
    pub details: BTreeMap<String, String>,
}

/// Result of answering one question
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    Next(Prompt),
    Completed(Summary),
}

/// Questionnaire state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Questionnaire {
    service: Service,
    step: usize,
    answers: BTreeMap<String, String>,
    completed: bool,
}

impl Questionnaire {
    /// Start at the first question of `service`
    pub fn new(service: Service) -> Self {
        Self {
            service,
            step: 0,
            answers: BTreeMap::new(),
            completed: false,
        }
    }

    pub fn service(&self) -> Service {
        self.service
    }

    pub fn is_active(&self) -> bool {
        !self.completed
    }

    pub fn answers(&self) -> &BTreeMap<String, String> {
        &self.answers
    }

    /// The pending question, or `None` once completed
    pub fn current(&self) -> Option<Prompt> {
        if self.completed {
            return None;
        }

        let questions = self.service.questions();
        let question = questions.get(self.step)?;
        let visible = |q: &&Question| q.is_visible(&self.answers);

        Some(Prompt {
            key: question.key,
            message: question.message,
            options: question.options,
            step: questions[..self.step].iter().filter(visible).count() + 1,
            total_steps: questions.iter().filter(visible).count(),
            is_last_step: !questions[self.step + 1..].iter().any(|q| visible(&q)),
        })
    }

    /// Record the answer to the pending question and move on
    ///
    /// An answer outside the question's options is rejected and leaves the
    /// state unchanged.
    pub fn answer(&mut self, response: &str) -> Result<Progress> {
        if self.completed {
            return Err(RahalahError::Questionnaire(format!(
                "The {} questionnaire is already completed",
                self.service
            )));
        }

        let questions = self.service.questions();
        let question = questions.get(self.step).ok_or_else(|| {
            RahalahError::Questionnaire(format!("No question at step {}", self.step))
        })?;

        let value = question.accept(response).ok_or_else(|| {
            RahalahError::Questionnaire(format!(
                "'{}' is not one of: {}",
                response.trim(),
                question.options.join(", ")
            ))
        })?;
        self.answers.insert(question.key.to_string(), value);

        self.step += 1;
        while questions
            .get(self.step)
            .is_some_and(|q| !q.is_visible(&self.answers))
        {
            self.step += 1;
        }

        match self.current() {
            Some(prompt) => Ok(Progress::Next(prompt)),
            None => {
                self.completed = true;
                tracing::debug!(
                    "Completed {} questionnaire with {} answers",
                    self.service,
                    self.answers.len()
                );
                Ok(Progress::Completed(self.summary_unchecked()))
            }
        }
    }

    /// Summary of the answers, once completed
    pub fn summary(&self) -> Option<Summary> {
        self.completed.then(|| self.summary_unchecked())
    }

    /// Clear all answers and return to the first question
    pub fn reset(&mut self) {
        self.step = 0;
        self.answers.clear();
        self.completed = false;
    }

    fn summary_unchecked(&self) -> Summary {
        Summary {
            service: self.service,
            details: self.answers.clone(),
        }
    }
}
