use mmm_core::ChallengeKind;

const HOME_HELP: &str = "\
Memory Master Mind

Train your working memory with four kinds of challenge:

  Static Number Sequence   memorize a row of numbers, then type them
  Timed Number Sequence    numbers appear one at a time, then type them all
  Math (Arithmetic)        calculate an expression in your head
  Quotes and Verses        fill in the hidden words of a quote

Each challenge has a level. Solve ch_per_level challenges on the first try
to go up a level; a wrong answer, a revealed answer or an abandoned answer
costs a level.

Keys
  j / k / Tab      move the selection
  Enter            open the selected challenge
  p                preferences (stats logging)
  ?                this help
  q                quit";

const CHALLENGE_KEYS: &str = "\
Keys
  Enter      start answering, submit, or next challenge after a solve
  n          new challenge
  r          repeat the same challenge
  s          show the answer (costs a level)
  p          preferences for this challenge
  h          home
  Esc        restart this challenge view
  ?          this help
  q          quit";

const NUMBERS_HELP: &str = "\
Static Number Sequence

A row of numbers is shown. Memorize it; the numbers are hidden when the
countdown ends or when you start typing. Type the numbers separated by
spaces and press Enter.

Primes are shown in red when primes_are_red is set.";

const TIMED_HELP: &str = "\
Timed Number Sequence

Numbers are shown one at a time, seconds_per_level seconds each. Typing is
disabled until the sequence ends. Then type every number in order,
separated by spaces, and press Enter.";

const MATH_HELP: &str = "\
Math (Arithmetic)

An expression with one operand per level is shown. Calculate it and type
the result. Fractions are truncated to solve_frac_dec decimals; a ~ in the
answer marks a truncated result.

Operators are evaluated with the usual precedence.";

const QUOTES_HELP: &str = "\
Quotes and Verses

Some words of a quote are hidden. Type the hidden words in order, separated
by spaces. Case, punctuation and line breaks are optional.

The answer box starts in text mode, where letters are typed instead of
acting as shortcuts and Enter inserts a line break. Press Tab or Esc to
switch to menu mode, then Enter to submit.";

/// Help text for the home screen, or for a challenge when `kind` is set.
pub fn help_text(kind: Option<ChallengeKind>) -> String {
    let body = match kind {
        None => return HOME_HELP.to_string(),
        Some(ChallengeKind::StaticNumbers) => NUMBERS_HELP,
        Some(ChallengeKind::TimedNumbers) => TIMED_HELP,
        Some(ChallengeKind::MathArithmetic) => MATH_HELP,
        Some(ChallengeKind::Quotes) => QUOTES_HELP,
    };
    format!("{body}\n\n{CHALLENGE_KEYS}")
}
