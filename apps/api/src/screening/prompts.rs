// All LLM prompt constants for the screening module.
// Placeholders are filled with `llm_client::prompts::fill_template`.

/// System prompt for leaderboard mode. Combined with `JSON_ONLY_SYSTEM`.
pub const LEADERBOARD_SYSTEM: &str = "You are an experienced technical recruiter \
    screening résumés against a job description.";

/// Leaderboard prompt template. Replace `{resume_text}` and `{job_description}`.
pub const LEADERBOARD_PROMPT_TEMPLATE: &str = r#"Analyze this resume against the job description.

Return a JSON object with these EXACT keys:
{
  "candidate_name": "Full name, or 'Unknown' if not stated",
  "match_score": 0,
  "years_experience": "Estimate from the text",
  "key_skills": ["Skill1", "Skill2", "Skill3"],
  "summary": "2 sentence executive summary",
  "red_flags": "Any concerns, or 'None'",
  "email_draft": "A short email to the candidate inviting them for an interview"
}

Rules:
- match_score is an INTEGER from 0 to 100 measuring fit for this specific role.
- key_skills lists the skills most relevant to the job description, strongest first.
- Base every field on the resume text only. Do not invent employers, dates or degrees.

RESUME:
{resume_text}

JOB DESCRIPTION:
{job_description}"#;

/// System prompt for report mode.
pub const REPORT_SYSTEM: &str = "You are an experienced technical recruiter. \
    Write concise, well-structured markdown for a hiring manager. \
    Do NOT wrap the report in code fences.";

/// Report prompt template. Replace `{resume_text}` and `{job_description}`.
pub const REPORT_PROMPT_TEMPLATE: &str = r#"Assess the following resume against the job description and write a short report in markdown.

Use exactly these sections:

### Candidate
Name of the candidate, or "Unknown".

### Match Score
A single score in the form X/10, where 10 is a perfect fit for this role.

### Strengths
3 to 5 bullet points grounded in the resume.

### Gaps
Requirements from the job description the resume does not show.

### Recommendation
One of: Interview, Maybe, Reject, followed by one sentence of reasoning.

RESUME:
{resume_text}

JOB DESCRIPTION:
{job_description}"#;
