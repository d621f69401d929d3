//! Prompt construction for the structured generation call.

use super::session::PlanRequest;

/// Interpolate the collected fields into the natural-language prompt
/// the generation backend receives.
pub fn build_prompt(request: &PlanRequest) -> String {
    format!(
        "Create a comprehensive recreational therapy plan for:\n\n\
         Patient Information:\n\
         - Name: {name}\n\
         - Age: {age}\n\
         - Diagnosis: {diagnosis}\n\
         - Functional Level: {functional_level}\n\n\
         Goals:\n\
         - Primary Goal: {primary_goal}\n\
         - Secondary Goals: {secondary_goals}\n\n\
         Patient Profile:\n\
         - Interests: {interests}\n\
         - Limitations: {limitations}\n\n\
         Session Details:\n\
         - Duration: {session_minutes} minutes\n\
         - Frequency: {frequency}\n\
         - Program Duration: {program_weeks} weeks\n\n\
         Please provide a detailed therapy plan with specific activities, objectives, and progress measures.",
        name = request.patient_name,
        age = request.age,
        diagnosis = request.diagnosis,
        functional_level = request.functional_level.as_str(),
        primary_goal = request.primary_goal,
        secondary_goals = request.secondary_goals,
        interests = request.interests,
        limitations = request.limitations,
        session_minutes = request.session_minutes,
        frequency = request.frequency.as_str(),
        program_weeks = request.program_weeks,
    )
}
