// src/utils/shuffle.rs

use rand::Rng;

use crate::models::question::{Question, ShuffledQuestion};

/// Produces a per-session copy of one question with its options in a fresh
/// random order and the correct index remapped to follow the answer text.
///
/// The permutation is an unbiased Fisher-Yates over the option indices:
/// element i swaps with a uniformly chosen element in [0, i], from the last
/// index down to 1.
pub fn shuffle_question(question: &Question, rng: &mut impl Rng) -> ShuffledQuestion {
    let mut order: Vec<usize> = (0..question.options.len()).collect();
    for i in (1..order.len()).rev() {
        let j = rng.random_range(0..=i);
        order.swap(i, j);
    }

    let mut correct_answer_index = 0;
    let options = order
        .iter()
        .enumerate()
        .map(|(new_index, &original_index)| {
            if original_index == question.correct_answer_index {
                correct_answer_index = new_index;
            }
            question.options[original_index].clone()
        })
        .collect();

    ShuffledQuestion {
        id: question.id,
        text: question.text.clone(),
        options,
        correct_answer_index,
        visual_type: question.visual_type.clone(),
    }
}

/// Shuffles the whole bank for a new exam session. Called on every start and
/// every retry so each sitting sees a fresh option order.
pub fn shuffle_paper(bank: &[Question], rng: &mut impl Rng) -> Vec<ShuffledQuestion> {
    bank.iter().map(|q| shuffle_question(q, rng)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn sample_question() -> Question {
        Question {
            id: 7,
            text: "which one".to_string(),
            options: vec![
                "alpha".to_string(),
                "beta".to_string(),
                "gamma".to_string(),
                "delta".to_string(),
                "epsilon".to_string(),
            ],
            correct_answer_index: 2,
            visual_type: None,
        }
    }

    #[test]
    fn shuffle_preserves_option_multiset() {
        let q = sample_question();
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..50 {
            let shuffled = shuffle_question(&q, &mut rng);
            let mut original = q.options.clone();
            let mut permuted = shuffled.options.clone();
            original.sort();
            permuted.sort();
            assert_eq!(original, permuted);
        }
    }

    #[test]
    fn correct_index_follows_answer_text() {
        let q = sample_question();
        let correct_text = &q.options[q.correct_answer_index];
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..100 {
            let shuffled = shuffle_question(&q, &mut rng);
            assert_eq!(&shuffled.options[shuffled.correct_answer_index], correct_text);
            // Exactly one index carries the originally-correct text.
            let matches = shuffled
                .options
                .iter()
                .filter(|opt| *opt == correct_text)
                .count();
            assert_eq!(matches, 1);
        }
    }

    #[test]
    fn every_position_is_reachable() {
        let q = sample_question();
        let mut seen = [false; 5];
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..200 {
            let shuffled = shuffle_question(&q, &mut rng);
            seen[shuffled.correct_answer_index] = true;
        }
        assert!(seen.iter().all(|&s| s), "correct answer never landed on some position");
    }

    #[test]
    fn two_option_question_shuffles() {
        let q = Question {
            id: 1,
            text: "t".to_string(),
            options: vec!["yes".to_string(), "no".to_string()],
            correct_answer_index: 0,
            visual_type: None,
        };
        let mut rng = StdRng::seed_from_u64(3);
        let shuffled = shuffle_question(&q, &mut rng);
        assert_eq!(shuffled.options.len(), 2);
        assert_eq!(shuffled.options[shuffled.correct_answer_index], "yes");
    }
}
