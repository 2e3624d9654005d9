//! Preamble that grounds the chat assistant in the portfolio content

use std::fmt::Write as _;

use crate::content::SiteContent;

/// Build the context sent once when a chat session opens
pub fn assemble_preamble(content: &SiteContent) -> String {
    let profile = &content.profile;
    let mut out = String::new();

    let _ = writeln!(
        out,
        "You are a helpful AI assistant for {}'s portfolio website.\n",
        profile.name
    );

    out.push_str("PERSONAL INFORMATION:\n");
    let _ = writeln!(out, "- Name: {}", profile.name);
    let _ = writeln!(out, "- Title: {}", profile.title);
    let _ = writeln!(out, "- Bio: {}", profile.bio);
    let _ = writeln!(out, "- Email: {}\n", profile.email);

    let social = [
        ("GitHub", &profile.social.github),
        ("LinkedIn", &profile.social.linkedin),
        ("Instagram", &profile.social.instagram),
    ];
    if social.iter().any(|(_, link)| link.is_some()) {
        out.push_str("SOCIAL LINKS:\n");
        for (label, link) in social {
            if let Some(link) = link {
                let _ = writeln!(out, "- {label}: {link}");
            }
        }
        out.push('\n');
    }

    if !content.skills.is_empty() {
        out.push_str("SKILLS:\n");
        for skill in &content.skills {
            let _ = writeln!(out, "- {skill}");
        }
        out.push('\n');
    }

    if !content.projects.is_empty() {
        out.push_str("PROJECTS:\n");
        for project in &content.projects {
            let _ = writeln!(out, "{}. {}", project.id, project.title);
            let _ = writeln!(out, "   Description: {}", project.description);
            let _ = writeln!(out, "   Tech Stack: {}\n", project.tech_stack.join(", "));
        }
    }

    out.push_str("INSTRUCTIONS:\n");
    let _ = writeln!(
        out,
        "- Answer questions about {}'s skills, projects, experience, and contact information",
        profile.name
    );
    out.push_str("- Be friendly, professional, and concise\n");
    out.push_str(
        "- If asked about something not in the portfolio data, politely say you don't have that information\n",
    );
    out.push_str("- Encourage visitors to reach out via email for more details\n");
    out.push_str("- Use the context above to provide accurate information\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{Profile, Project, SocialLinks};

    fn small() -> SiteContent {
        SiteContent {
            profile: Profile {
                name: "Ada".into(),
                title: "Analyst".into(),
                bio: "First programmer.".into(),
                email: "ada@example.com".into(),
                social: SocialLinks {
                    github: Some("https://github.com/ada".into()),
                    ..SocialLinks::default()
                },
                image: None,
            },
            skills: vec!["Mathematics".into(), "Poetry".into()],
            projects: vec![Project {
                id: 1,
                title: "Notes".into(),
                description: "Notes on the Analytical Engine".into(),
                tech_stack: vec!["Ink".into(), "Paper".into()],
            }],
            blog: Default::default(),
        }
    }

    #[test]
    fn sections_in_order() {
        insta::assert_snapshot!(assemble_preamble(&small()), @r"
        You are a helpful AI assistant for Ada's portfolio website.

        PERSONAL INFORMATION:
        - Name: Ada
        - Title: Analyst
        - Bio: First programmer.
        - Email: ada@example.com

        SOCIAL LINKS:
        - GitHub: https://github.com/ada

        SKILLS:
        - Mathematics
        - Poetry

        PROJECTS:
        1. Notes
           Description: Notes on the Analytical Engine
           Tech Stack: Ink, Paper

        INSTRUCTIONS:
        - Answer questions about Ada's skills, projects, experience, and contact information
        - Be friendly, professional, and concise
        - If asked about something not in the portfolio data, politely say you don't have that information
        - Encourage visitors to reach out via email for more details
        - Use the context above to provide accurate information
        ");
    }

    #[test]
    fn empty_sections_are_omitted() {
        let mut content = small();
        content.profile.social = SocialLinks::default();
        content.skills.clear();
        content.projects.clear();

        let preamble = assemble_preamble(&content);
        assert!(!preamble.contains("SOCIAL LINKS"));
        assert!(!preamble.contains("SKILLS"));
        assert!(!preamble.contains("PROJECTS"));
        assert!(preamble.contains("INSTRUCTIONS:"));
    }

    #[test]
    fn builtin_preamble_lists_every_project() {
        let content = SiteContent::builtin().unwrap();
        let preamble = assemble_preamble(&content);
        for project in &content.projects {
            assert!(preamble.contains(&project.title), "{}", project.title);
        }
        assert!(preamble.starts_with("You are a helpful AI assistant for Alex Doe's"));
    }
}
