/// Cosine similarity between two vectors. Mismatched lengths or a zero-norm
/// input score zero.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
	if a.len() != b.len() || a.is_empty() {
		return 0.0;
	}

	let mut dot = 0.0_f32;
	let mut norm_a = 0.0_f32;
	let mut norm_b = 0.0_f32;

	for (x, y) in a.iter().zip(b.iter()) {
		dot += x * y;
		norm_a += x * x;
		norm_b += y * y;
	}

	if norm_a == 0.0 || norm_b == 0.0 {
		return 0.0;
	}

	(dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(-1.0, 1.0)
}

/// Maps a similarity score onto the 0-100 confidence scale.
pub fn similarity_to_confidence(similarity: f32) -> f32 {
	(similarity * 100.0).clamp(0.0, 100.0)
}

/// Additive confidence boost for research interests overlapping opportunity
/// keywords. Substring containment in either direction counts as a match.
pub fn keyword_boost(
	interests: &[String],
	keywords: &[String],
	points_per_match: f32,
	cap: f32,
) -> f32 {
	if interests.is_empty() || keywords.is_empty() {
		return 0.0;
	}

	let interests: Vec<String> = interests.iter().map(|text| text.to_lowercase()).collect();
	let keywords: Vec<String> = keywords.iter().map(|text| text.to_lowercase()).collect();
	let mut matches = 0_u32;

	for interest in &interests {
		for keyword in &keywords {
			if keyword.contains(interest.as_str()) || interest.contains(keyword.as_str()) {
				matches += 1;
			}
		}
	}

	(matches as f32 * points_per_match).min(cap)
}

/// Confidence with the keyword boost applied, capped at 100.
pub fn final_confidence(similarity: f32, boost: f32) -> f32 {
	(similarity_to_confidence(similarity) + boost).min(100.0)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn strings(values: &[&str]) -> Vec<String> {
		values.iter().map(|value| value.to_string()).collect()
	}

	#[test]
	fn identical_vectors_score_one() {
		let v = [0.5_f32, 0.5, 0.7];

		assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
	}

	#[test]
	fn orthogonal_vectors_score_zero() {
		assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
	}

	#[test]
	fn zero_norm_and_mismatched_inputs_score_zero() {
		assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
		assert_eq!(cosine_similarity(&[1.0], &[1.0, 1.0]), 0.0);
		assert_eq!(cosine_similarity(&[], &[]), 0.0);
	}

	#[test]
	fn confidence_clamps_to_the_percentage_scale() {
		assert_eq!(similarity_to_confidence(0.75), 75.0);
		assert_eq!(similarity_to_confidence(-0.2), 0.0);
		assert_eq!(similarity_to_confidence(1.5), 100.0);
	}

	#[test]
	fn keyword_boost_counts_containment_both_ways() {
		let interests = strings(&["machine learning", "optics"]);
		let keywords = strings(&["Machine Learning Systems", "photonics"]);

		// "machine learning" is contained in the first keyword.
		assert_eq!(keyword_boost(&interests, &keywords, 5.0, 20.0), 5.0);
	}

	#[test]
	fn keyword_boost_is_capped() {
		let interests = strings(&["ai", "ml", "cv", "nlp", "hci"]);
		let keywords = strings(&["ai", "ml", "cv", "nlp", "hci"]);

		assert_eq!(keyword_boost(&interests, &keywords, 5.0, 20.0), 20.0);
	}

	#[test]
	fn empty_inputs_boost_nothing() {
		assert_eq!(keyword_boost(&[], &strings(&["ai"]), 5.0, 20.0), 0.0);
		assert_eq!(keyword_boost(&strings(&["ai"]), &[], 5.0, 20.0), 0.0);
	}

	#[test]
	fn final_confidence_caps_at_one_hundred() {
		assert_eq!(final_confidence(0.95, 20.0), 100.0);
		assert_eq!(final_confidence(0.5, 10.0), 60.0);
	}
}
