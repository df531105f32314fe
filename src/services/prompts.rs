use crate::models::RecommendationInput;

/// Builds the model prompt for three seed titles
///
/// The reply format matters: records are picked out of the live stream by
/// their key order, so the example object lists the keys exactly as the
/// stream scanner expects them.
pub fn recommendation_prompt(input: &RecommendationInput) -> String {
    let [first, second, third] = input.titles();

    format!(
        r#"You are an expert movie and TV show recommendation assistant.
A user has provided three titles they enjoyed:
1. "{first}"
2. "{second}"
3. "{third}"

Your task is to:
A. Briefly analyze what is common across these three titles. Consider genre, subgenre, themes, narrative style, character archetypes, directors, actors, tone and pacing.
B. Based on this analysis, recommend exactly 5 new movies or TV shows that the user would likely enjoy.
C. After your analysis, write a single JSON object with a key "recommendations" holding an array of 5 objects.

Every object must contain these keys in exactly this order: "title", "year", "type", "brief_reasoning", "country", "original_language".

Example format:
{{
  "recommendations": [
    {{
      "title": "The Matrix",
      "year": 1999,
      "type": "Movie",
      "brief_reasoning": "Like your favorites, this combines philosophical themes with innovative visual storytelling and explores questions about reality and human nature.",
      "country": "US",
      "original_language": "en"
    }}
  ]
}}

Important guidelines:
- Be as specific as possible with titles (include original titles if different from English)
- For anime, specify if it's the anime version vs live-action
- Use ISO country codes (US, JP, KR, etc.) and ISO language codes (en, ja, ko, etc.)
- Focus on diverse, high-quality recommendations that go beyond obvious surface-level similarities
- Do not recommend the input titles themselves
- "year" must be a number and "type" must be either "Movie" or "TV Show""#
    )
}
