#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SocialLink {
    pub label: &'static str,
    pub url: &'static str,
}

pub const SOCIAL_LINKS: [SocialLink; 6] = [
    SocialLink {
        label: ".COM",
        url: "https://jonathanschimpf.com/",
    },
    SocialLink {
        label: ".DEV",
        url: "https://jonathanschimpf.dev/",
    },
    SocialLink {
        label: "LinkedIn",
        url: "https://www.linkedin.com/in/jonathan-schimpf/",
    },
    SocialLink {
        label: "GitHub",
        url: "https://github.com/jonathanschimpf",
    },
    SocialLink {
        label: "Instagram",
        url: "https://www.instagram.com/schimpfstagram/",
    },
    SocialLink {
        label: "Threads",
        url: "https://www.threads.net/@schimpfstagram",
    },
];
