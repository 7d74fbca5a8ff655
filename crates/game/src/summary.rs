/// Text shown once the last round is over.
pub fn game_over_text(correct: u32, total: u32) -> String {
    if correct == total {
        "Wow! Great job!\nYou got them all!".to_string()
    } else if correct == 0 {
        "Oops! You found none.\nBetter luck next time!".to_string()
    } else {
        format!("You found {correct} out of {total}!\nThink you can get\na perfect score?")
    }
}

#[cfg(test)]
mod tests {
    use super::game_over_text;

    #[test]
    fn picks_message_by_score() {
        assert_eq!(game_over_text(3, 3), "Wow! Great job!\nYou got them all!");
        assert_eq!(game_over_text(0, 3), "Oops! You found none.\nBetter luck next time!");
        assert_eq!(
            game_over_text(2, 3),
            "You found 2 out of 3!\nThink you can get\na perfect score?"
        );
    }
}
