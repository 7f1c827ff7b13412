// Resume extraction prompt templates.

/// Resume text beyond this many characters is not sent to the model.
pub const MAX_RESUME_CHARS: usize = 8000;

pub const RESUME_PARSE_SYSTEM: &str = r#"You are a precise resume parser. Extract ONLY information that appears EXACTLY in the provided resume text.

STRICT RULES - VIOLATION RESULTS IN INVALID RESPONSE:
- ONLY extract skills that appear VERBATIM in the resume text
- DO NOT add, assume, or infer any skills not explicitly written in the text
- If no skills are explicitly mentioned, return an empty skills array []
- Extract work experience ONLY if job titles, companies, and descriptions are clearly stated
- Extract education ONLY if degrees/institutions are explicitly mentioned
- DO NOT hallucinate or add any information not present in the text

Return ONLY valid JSON:
{
  "skills": ["skill1", "skill2"],
  "experience": [
    { "role": "Job Title", "company": "Company Name", "years": 5, "description": "Details" }
  ],
  "education": "Degree and Institution details"
}"#;

pub const RESUME_PARSE_PROMPT: &str = r#"Parse this resume text and extract ONLY information explicitly mentioned:

Filename: {filename}

{resume_text}

Extract:
1. Skills explicitly mentioned
2. Work experience entries clearly described
3. Education details if mentioned

Return JSON with only the information found in the text above."#;

/// Fills the user prompt, truncating the resume to `MAX_RESUME_CHARS` characters.
pub fn build_prompt(raw_text: &str, filename: &str) -> String {
    let truncated: String = raw_text.chars().take(MAX_RESUME_CHARS).collect();
    RESUME_PARSE_PROMPT
        .replace("{filename}", filename)
        .replace("{resume_text}", &truncated)
}
