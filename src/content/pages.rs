//! Static page copy. Served as-is; nothing here is computed.

use serde::Serialize;

use crate::feedback::dto::FeedbackCategory;

#[derive(Debug, Clone, Serialize)]
pub struct Card {
    pub title: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct Figure {
    pub label: &'static str,
    pub value: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct Testimonial {
    pub quote: &'static str,
    pub author: &'static str,
    pub role: &'static str,
    pub rating: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct TeamMember {
    pub name: &'static str,
    pub initials: String,
    pub role: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpcomingFeature {
    pub title: &'static str,
    pub description: &'static str,
    pub status: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct Milestone {
    pub quarter: &'static str,
    pub features: &'static [&'static str],
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryOption {
    pub value: FeedbackCategory,
    pub label: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HomePage {
    pub headline: &'static str,
    pub tagline: &'static str,
    pub trust_indicators: &'static [&'static str],
    pub features_heading: &'static str,
    pub features: Vec<Card>,
    pub stats: Vec<Figure>,
    pub testimonials: Vec<Testimonial>,
}

#[derive(Debug, Serialize)]
pub struct AboutPage {
    pub intro: &'static str,
    pub mission: &'static [&'static str],
    pub why_choose: &'static [&'static str],
    pub features: Vec<Card>,
    pub team: Vec<TeamMember>,
    pub data_sources: Vec<Card>,
    pub data_protection: &'static [&'static str],
    pub transparent_practices: &'static [&'static str],
}

#[derive(Debug, Serialize)]
pub struct FutureScopePage {
    pub intro: &'static str,
    pub highlight: &'static str,
    pub upcoming_features: Vec<UpcomingFeature>,
    pub roadmap: Vec<Milestone>,
    pub beta_benefits: Vec<Card>,
    pub vision: &'static str,
}

#[derive(Debug, Serialize)]
pub struct FeedbackPage {
    pub intro: &'static str,
    pub categories: Vec<CategoryOption>,
    pub contact: Vec<Card>,
    pub faq: Vec<Card>,
    pub community: Vec<Figure>,
}

fn card(title: &'static str, description: &'static str) -> Card {
    Card { title, description }
}

fn figure(value: &'static str, label: &'static str) -> Figure {
    Figure { label, value }
}

fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|part| part.chars().next())
        .collect()
}

pub fn home() -> HomePage {
    let testimonial = Testimonial {
        quote: "Mediyo has been a game-changer for my practice. The AI analysis helps me \
                provide better patient care.",
        author: "Dr. Sarah Johnson",
        role: "General Practitioner",
        rating: 5,
    };
    HomePage {
        headline: "Know your medicine before you take it",
        tagline: "Your AI safety advisor for every dose. Scan, analyze, and get instant insights \
                  about any medicine with advanced AI technology.",
        trust_indicators: &[
            "AI Transparency",
            "Secured Authentication",
            "Healthcare Focused",
        ],
        features_heading: "Complete Medicine Safety Solution",
        features: vec![
            card(
                "Smart Scanning",
                "Instantly scan medicine packages using your camera or upload images for \
                 AI-powered analysis",
            ),
            card(
                "Safety Analysis",
                "Get comprehensive safety reports with composition breakdown and age-group \
                 recommendations",
            ),
            card(
                "Personalized Advice",
                "Receive tailored recommendations based on your age, health conditions, and \
                 medical history",
            ),
        ],
        stats: vec![
            figure("50K+", "Medicines Scanned"),
            figure("98%", "Accuracy Rate"),
            figure("10K+", "Happy Users"),
        ],
        testimonials: vec![testimonial.clone(), testimonial.clone(), testimonial],
    }
}

pub fn about() -> AboutPage {
    let team = [
        (
            "Dr. Sarah Johnson",
            "Chief Medical Officer",
            "Leading physician with 15+ years in pharmaceutical safety research.",
        ),
        (
            "Raj Patel",
            "AI Research Lead",
            "Machine learning expert specializing in healthcare applications.",
        ),
        (
            "Priya Sharma",
            "Product Manager",
            "Healthcare technology specialist focused on user-centered design.",
        ),
    ];

    AboutPage {
        intro: "Empowering individuals across India to make informed medication decisions \
                through cutting-edge AI technology and comprehensive safety analysis.",
        mission: &[
            "At Mediyo, we're committed to helping all of India avoid wrong medicines and use \
             the right dose at the right time. Our AI-powered platform provides instant, \
             accurate analysis of medications to ensure safety and efficacy.",
            "We believe that everyone deserves access to reliable medication information. \
             Through advanced technology and user-friendly design, we're making healthcare \
             safer and more accessible for millions.",
        ],
        why_choose: &[
            "Instant medicine analysis using advanced AI",
            "Comprehensive safety reports for all age groups",
            "Personalized recommendations based on health profile",
            "24/7 AI assistant for medication queries",
        ],
        features: vec![
            card(
                "AI-Powered Analysis",
                "Advanced machine learning algorithms analyze medicine composition and safety \
                 profiles instantly.",
            ),
            card(
                "Safety First",
                "Comprehensive safety assessments including age group recommendations and \
                 interaction warnings.",
            ),
            card(
                "Personalized Insights",
                "Tailored recommendations based on individual health profiles and medical \
                 conditions.",
            ),
            card(
                "Certified Sources",
                "Information verified against trusted medical databases and regulatory \
                 guidelines.",
            ),
        ],
        team: team
            .into_iter()
            .map(|(name, role, description)| TeamMember {
                name,
                initials: initials(name),
                role,
                description,
            })
            .collect(),
        data_sources: vec![
            card(
                "Medical Databases",
                "FDA Orange Book, WHO Essential Medicines List, and Indian Pharmacopoeia",
            ),
            card(
                "Research Sources",
                "PubMed, Cochrane Library, and peer-reviewed pharmaceutical journals",
            ),
            card(
                "Regulatory Guidelines",
                "CDSCO, FDA, EMA, and WHO safety guidelines and recommendations",
            ),
        ],
        data_protection: &[
            "End-to-end encryption for all data transmission",
            "No sharing of personal health information",
            "Secure cloud storage with HIPAA compliance",
            "User-controlled data retention policies",
        ],
        transparent_practices: &[
            "Clear privacy policy with no hidden clauses",
            "User consent for all data processing",
            "Regular security audits and updates",
            "Right to data deletion and portability",
        ],
    }
}

pub fn future_scope() -> FutureScopePage {
    let upcoming = |title, description, status| UpcomingFeature {
        title,
        description,
        status,
    };
    FutureScopePage {
        intro: "We're building the most comprehensive healthcare platform in India. Join us on \
                this journey to revolutionize medication safety and accessibility.",
        highlight: "Coming Soon: Doctor Consultations",
        upcoming_features: vec![
            upcoming(
                "Chat with Doctors",
                "Connect directly with verified healthcare professionals for personalized \
                 consultations.",
                "Coming Q2 2024",
            ),
            upcoming(
                "Prescription Upload",
                "Upload and analyze entire prescriptions for comprehensive medication reviews.",
                "Coming Q3 2024",
            ),
            upcoming(
                "Multilingual Support",
                "Support for Hindi, Tamil, Telugu, Bengali, and 10+ regional Indian languages.",
                "Coming Q4 2024",
            ),
            upcoming(
                "Family Profiles",
                "Manage medication safety for your entire family with individual health \
                 profiles.",
                "Coming 2025",
            ),
        ],
        roadmap: vec![
            Milestone {
                quarter: "Q2 2024",
                features: &[
                    "Doctor Chat Integration",
                    "Enhanced AI Accuracy",
                    "Medicine Database Expansion",
                ],
            },
            Milestone {
                quarter: "Q3 2024",
                features: &[
                    "Prescription Analysis",
                    "Drug Interaction Checker",
                    "iOS & Android Apps",
                ],
            },
            Milestone {
                quarter: "Q4 2024",
                features: &["Multilingual Support", "Voice Commands", "Offline Mode"],
            },
            Milestone {
                quarter: "2025",
                features: &[
                    "Family Profiles",
                    "Pharmacy Integration",
                    "Insurance Partnerships",
                ],
            },
        ],
        beta_benefits: vec![
            card("Early Access", "Try new features before public release"),
            card("Direct Feedback", "Your input shapes our development"),
            card("Exclusive Benefits", "Special rewards and recognition"),
        ],
        vision: "To become India's most trusted healthcare companion, empowering every citizen \
                 with AI-powered medical insights, connecting them with healthcare \
                 professionals, and ensuring safe medication practices across all communities \
                 and languages.",
    }
}

pub fn feedback() -> FeedbackPage {
    FeedbackPage {
        intro: "Help us improve Mediyo by sharing your thoughts, suggestions, or reporting any \
                issues you've encountered.",
        categories: FeedbackCategory::ALL
            .into_iter()
            .map(|value| CategoryOption {
                value,
                label: value.label(),
            })
            .collect(),
        contact: vec![
            card("Email Support", "support@mediyo.com"),
            card("Response Time", "Within 24 hours"),
            card("Priority Support", "Medical emergencies: Contact your doctor"),
        ],
        faq: vec![
            card(
                "How accurate is the AI analysis?",
                "Our AI achieves 98% accuracy rate with continuous improvements",
            ),
            card(
                "Is my health data secure?",
                "Yes, we use end-to-end encryption and HIPAA compliance",
            ),
            card(
                "Can I use Mediyo offline?",
                "Offline mode is coming in Q4 2024",
            ),
        ],
        community: vec![
            figure("2,500+", "Feedback Received"),
            figure("150+", "Features Implemented"),
            figure("6 hours", "Avg. Response Time"),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn team_initials() {
        let page = about();
        let got: Vec<_> = page.team.iter().map(|m| m.initials.as_str()).collect();
        assert_eq!(got, vec!["DSJ", "RP", "PS"]);
    }

    #[test]
    fn feedback_page_lists_every_category() {
        let page = feedback();
        assert_eq!(page.categories.len(), 5);
        assert_eq!(page.categories[0].label, "General Feedback");
    }
}
