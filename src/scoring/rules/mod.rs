mod ordered_list;
mod question;
mod score;

pub use ordered_list::OrderedListPointsRule;
pub use question::QuestionPointsRule;
pub use score::ScorePointsRule;
