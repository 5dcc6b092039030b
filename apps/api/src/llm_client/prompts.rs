// Cross-cutting prompt fragments. Task prompts live in ai/prompts.rs.

/// System prompt shared by every AI task; `goal` names the task.
pub fn system_prompt(goal: &str) -> String {
    format!("You are an expert career assistant. {goal}. Respond concisely.")
}
