//! Image prompt. Depends on the recipe title only.

/// Render the image prompt.
pub fn render_image_prompt(title: &str) -> String {
    format!(
        "A professional food photograph of {title}, plated on a rustic table, soft natural light, shallow depth of field. No text."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_prompt() {
        let prompt = render_image_prompt("Lemon Herb Roasted Chicken");
        assert!(prompt.contains("photograph of Lemon Herb Roasted Chicken"));
    }
}
