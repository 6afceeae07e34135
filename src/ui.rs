use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Row, Table, Widget, Wrap},
};

use quizr::{controller::Presenter, Outcome, Question, ScoreboardEntry, ScoreboardError};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;
pub const MAX_INITIALS: usize = 8;

#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    Welcome,
    Question {
        question: Question,
        selected: usize,
    },
    EndQuiz {
        score: u64,
        initials: String,
        error: Option<String>,
    },
    Scoreboard {
        entries: Vec<ScoreboardEntry>,
    },
}

/// Screen state for the terminal. The controller pushes data in through
/// [`Presenter`]; key handling only moves the selection and edits initials.
#[derive(Debug)]
pub struct TerminalPresenter {
    pub screen: Screen,
    pub time_remaining: Option<i64>,
    pub feedback: Option<Outcome>,
}

impl Default for TerminalPresenter {
    fn default() -> Self {
        Self {
            screen: Screen::Welcome,
            time_remaining: None,
            feedback: None,
        }
    }
}

impl TerminalPresenter {
    pub fn select_next(&mut self) {
        if let Screen::Question { question, selected } = &mut self.screen {
            *selected = (*selected + 1) % question.answers.len();
        }
    }

    pub fn select_previous(&mut self) {
        if let Screen::Question { question, selected } = &mut self.screen {
            let len = question.answers.len();
            *selected = (*selected + len - 1) % len;
        }
    }

    /// Returns whether the index names an answer on screen.
    pub fn select(&mut self, index: usize) -> bool {
        match &mut self.screen {
            Screen::Question { question, selected } if index < question.answers.len() => {
                *selected = index;
                true
            }
            _ => false,
        }
    }

    pub fn push_initial(&mut self, c: char) {
        if let Screen::EndQuiz { initials, .. } = &mut self.screen {
            if initials.chars().count() < MAX_INITIALS {
                initials.push(c);
            }
        }
    }

    pub fn pop_initial(&mut self) {
        if let Screen::EndQuiz { initials, .. } = &mut self.screen {
            initials.pop();
        }
    }
}

impl Presenter for TerminalPresenter {
    fn show_welcome(&mut self) {
        self.screen = Screen::Welcome;
        self.time_remaining = None;
        self.feedback = None;
    }

    fn show_question(&mut self, question: &Question) {
        self.screen = Screen::Question {
            question: question.clone(),
            selected: 0,
        };
    }

    fn show_time_remaining(&mut self, seconds: i64) {
        self.time_remaining = Some(seconds);
    }

    fn show_feedback(&mut self, outcome: Outcome) {
        self.feedback = Some(outcome);
    }

    fn show_final_score(&mut self, score: u64) {
        self.screen = Screen::EndQuiz {
            score,
            initials: String::new(),
            error: None,
        };
        self.time_remaining = None;
    }

    fn show_initials_rejected(&mut self, reason: &ScoreboardError) {
        if let Screen::EndQuiz { error, .. } = &mut self.screen {
            *error = Some(reason.to_string());
        }
    }

    fn show_scoreboard(&mut self, entries: &[ScoreboardEntry]) {
        self.screen = Screen::Scoreboard {
            entries: entries.to_vec(),
        };
        self.time_remaining = None;
        self.feedback = None;
    }
}

impl Widget for &TerminalPresenter {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let dim_style = Style::default().add_modifier(Modifier::DIM);

        let chunks = Layout::vertical([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .split(area);

        self.render_status(chunks[0], buf);

        let help = match &self.screen {
            Screen::Welcome => {
                Paragraph::new(vec![
                    Line::from(Span::styled("Coding Quiz Challenge", bold_style)),
                    Line::from(""),
                    Line::from("Answer as many questions as you can before the clock runs out."),
                    Line::from("Wrong answers take time off the clock."),
                ])
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true })
                .render(chunks[1], buf);
                "(enter) start   (h) high scores   (esc) quit"
            }
            Screen::Question { question, selected } => {
                let mut lines = vec![
                    Line::from(Span::styled(question.text.as_str(), bold_style)),
                    Line::from(""),
                ];
                lines.extend(question.answers.iter().enumerate().map(|(i, answer)| {
                    let label = format!("{}. {}", i + 1, answer.text);
                    if i == *selected {
                        Line::from(Span::styled(
                            format!("> {label}"),
                            bold_style.fg(Color::Cyan),
                        ))
                    } else {
                        Line::from(format!("  {label}"))
                    }
                }));

                Paragraph::new(lines)
                    .wrap(Wrap { trim: false })
                    .render(chunks[1], buf);
                "(↑/↓) choose   (enter) answer   (1-9) answer directly   (esc) give up"
            }
            Screen::EndQuiz {
                score,
                initials,
                error,
            } => {
                let mut lines = vec![
                    Line::from(Span::styled("All done!", bold_style)),
                    Line::from(format!("Your final score is {score}.")),
                    Line::from(""),
                    Line::from(vec![
                        Span::raw("Enter your initials: "),
                        Span::styled(format!("{initials}_"), bold_style),
                    ]),
                ];
                if let Some(error) = error {
                    lines.push(Line::from(Span::styled(
                        error.as_str(),
                        Style::default().fg(Color::Red),
                    )));
                }

                Paragraph::new(lines)
                    .alignment(Alignment::Center)
                    .render(chunks[1], buf);
                "(enter) submit   (esc) skip"
            }
            Screen::Scoreboard { entries } => {
                let rows = entries.iter().enumerate().map(|(i, entry)| {
                    Row::new(vec![
                        (i + 1).to_string(),
                        entry.initials.clone(),
                        entry.score.to_string(),
                    ])
                });

                Table::new(
                    rows,
                    [
                        Constraint::Length(6),
                        Constraint::Length(12),
                        Constraint::Length(10),
                    ],
                )
                .header(Row::new(vec!["Rank", "Initials", "Score"]).style(bold_style))
                .block(Block::default().borders(Borders::ALL).title(" High scores "))
                .render(chunks[1], buf);
                "(b) back   (c) clear high scores   (esc) quit"
            }
        };

        Paragraph::new(Span::styled(help, dim_style))
            .alignment(Alignment::Center)
            .render(chunks[2], buf);
    }
}

impl TerminalPresenter {
    fn render_status(&self, area: Rect, buf: &mut Buffer) {
        let mut spans = Vec::new();

        if let Some(seconds) = self.time_remaining {
            let style = if seconds <= 10 {
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
            } else {
                Style::default().add_modifier(Modifier::BOLD)
            };
            spans.push(Span::styled(format!("Time: {}", seconds.max(0)), style));
        }

        if let Some(outcome) = self.feedback {
            let color = match outcome {
                Outcome::Correct => Color::Green,
                Outcome::Incorrect => Color::Red,
            };
            if !spans.is_empty() {
                spans.push(Span::raw("   "));
            }
            spans.push(Span::styled(
                outcome.to_string(),
                Style::default().fg(color).add_modifier(Modifier::ITALIC),
            ));
        }

        Paragraph::new(Line::from(spans))
            .alignment(Alignment::Right)
            .block(Block::default().borders(Borders::BOTTOM).title(" quizr "))
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quizr::Answer;

    fn question() -> Question {
        Question {
            id: 3,
            text: "The function to convert a value to an integer is:".into(),
            answers: vec![
                Answer::new("parseFloat()", false),
                Answer::new("toInteger()", false),
                Answer::new("parseInt()", true),
            ],
        }
    }

    fn rendered(presenter: &TerminalPresenter) -> String {
        let area = Rect::new(0, 0, 100, 20);
        let mut buf = Buffer::empty(area);
        presenter.render(area, &mut buf);
        buf.content().iter().map(|cell| cell.symbol()).collect()
    }

    #[test]
    fn test_selection_wraps() {
        let mut p = TerminalPresenter::default();
        p.show_question(&question());

        p.select_previous();
        assert_eq!(
            p.screen,
            Screen::Question {
                question: question(),
                selected: 2
            }
        );
        p.select_next();
        p.select_next();
        assert!(matches!(p.screen, Screen::Question { selected: 1, .. }));
    }

    #[test]
    fn test_select_out_of_range() {
        let mut p = TerminalPresenter::default();
        p.show_question(&question());

        assert!(p.select(2));
        assert!(!p.select(3));
        assert!(matches!(p.screen, Screen::Question { selected: 2, .. }));
    }

    #[test]
    fn test_initials_editing() {
        let mut p = TerminalPresenter::default();
        p.show_final_score(15);

        for c in "ABCDEFGHIJ".chars() {
            p.push_initial(c);
        }
        p.pop_initial();

        assert!(matches!(&p.screen, Screen::EndQuiz { initials, .. } if initials == "ABCDEFG"));
    }

    #[test]
    fn test_rejection_shown_on_end_screen() {
        let mut p = TerminalPresenter::default();
        p.show_final_score(15);
        p.show_initials_rejected(&ScoreboardError::EmptyInitials);

        assert!(rendered(&p).contains("initials must not be empty"));
    }

    #[test]
    fn test_question_screen_renders_answers_and_time() {
        let mut p = TerminalPresenter::default();
        p.show_time_remaining(42);
        p.show_feedback(Outcome::Incorrect);
        p.show_question(&question());

        let text = rendered(&p);
        assert!(text.contains("Time: 42"));
        assert!(text.contains("Wrong!"));
        assert!(text.contains("> 1. parseFloat()"));
        assert!(text.contains("3. parseInt()"));
    }

    #[test]
    fn test_scoreboard_screen_renders_ranks() {
        let mut p = TerminalPresenter::default();
        p.show_scoreboard(&[ScoreboardEntry::new("BCF", 20), ScoreboardEntry::new("AL", 10)]);

        let text = rendered(&p);
        assert!(text.contains("BCF"));
        assert!(text.contains("AL"));
        assert!(p.time_remaining.is_none());
    }
}
