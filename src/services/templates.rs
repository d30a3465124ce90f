//! Canned script text, picked by topic keywords and then by format.
//!
//! Topics are matched against [`RULES`] in order and the first hit decides the
//! category, so a topic mentioning both a public figure and a country always
//! lands on the public figure. Every category except the public figure has a
//! single template with `{topic}` placeholders.

use crate::core::model::{ScriptFormat, ScriptRequest};

const TOPIC_PLACEHOLDER: &str = "{topic}";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    PublicFigure,
    Country,
    Technology,
    Business,
    Health,
    Education,
    Generic,
}

struct CategoryRule {
    category: Category,
    keywords: &'static [&'static str],
}

impl CategoryRule {
    fn matches(&self, topic_lower: &str) -> bool {
        self.keywords.iter().any(|k| topic_lower.contains(k))
    }
}

const RULES: &[CategoryRule] = &[
    CategoryRule {
        category: Category::PublicFigure,
        keywords: &[
            "narendra modi",
            "modi",
            "prime minister modi",
            "pm modi",
            "indian prime minister",
        ],
    },
    CategoryRule {
        category: Category::Country,
        keywords: &[
            "india",
            "indian",
            "bharat",
            "hindustan",
            "delhi",
            "mumbai",
            "bangalore",
        ],
    },
    CategoryRule {
        category: Category::Technology,
        keywords: &[
            "technology",
            "ai",
            "artificial intelligence",
            "machine learning",
            "blockchain",
            "software",
            "digital",
            "tech",
            "computing",
        ],
    },
    CategoryRule {
        category: Category::Business,
        keywords: &[
            "business",
            "entrepreneurship",
            "startup",
            "marketing",
            "finance",
            "economy",
            "investment",
        ],
    },
    CategoryRule {
        category: Category::Health,
        keywords: &[
            "health",
            "medical",
            "healthcare",
            "fitness",
            "wellness",
            "medicine",
            "doctor",
        ],
    },
    CategoryRule {
        category: Category::Education,
        keywords: &[
            "education",
            "learning",
            "school",
            "university",
            "student",
            "teaching",
            "academic",
        ],
    },
];

pub fn classify(topic: &str) -> Category {
    let topic_lower = topic.to_lowercase();
    RULES
        .iter()
        .find(|rule| rule.matches(&topic_lower))
        .map(|rule| rule.category)
        .unwrap_or(Category::Generic)
}

/// Returns the script body for a request. Never empty.
pub fn select_content(request: &ScriptRequest) -> String {
    let category = classify(&request.topic);
    let template = template_for(category, request.format);
    template.replace(TOPIC_PLACEHOLDER, &request.topic)
}

fn template_for(category: Category, format: ScriptFormat) -> &'static str {
    match category {
        Category::PublicFigure => match format {
            ScriptFormat::Video => MODI_VIDEO,
            ScriptFormat::Podcast => MODI_PODCAST,
            ScriptFormat::Speech => MODI_SPEECH,
            ScriptFormat::Tutorial => MODI_TUTORIAL,
            ScriptFormat::Presentation => MODI_PRESENTATION,
        },
        Category::Country => COUNTRY,
        Category::Technology => TECHNOLOGY,
        Category::Business => BUSINESS,
        Category::Health => HEALTH,
        Category::Education => EDUCATION,
        Category::Generic => GENERIC,
    }
}

// --- Public figure ---

const MODI_PRESENTATION: &str = r#"Welcome everyone to today's presentation about Narendra Modi, India's Prime Minister.

Narendra Damodardas Modi, born on September 17, 1950, has served as India's Prime Minister since May 2014. His path from a tea seller's son in Vadnagar, Gujarat, to one of the most influential leaders in the world is a remarkable one.

Early Life and Political Journey:
Modi grew up in a modest family in Vadnagar. He joined the Rashtriya Swayamsevak Sangh (RSS) at a young age and later rose through the Bharatiya Janata Party (BJP).

Chief Minister of Gujarat (2001-2014):
For nearly thirteen years Modi led Gujarat, a period associated with strong economic growth, business-friendly policies and infrastructure development.

Major Initiatives as Prime Minister:
1. Digital India, which pushed digital payments, Aadhaar and e-governance.
2. Swachh Bharat Mission, under which over 100 million toilets were built.
3. Make in India, encouraging companies to manufacture in India.
4. Ayushman Bharat, a health scheme covering over 500 million people.
5. A more assertive role for India in international relations.

Economic Policies:
- Goods and Services Tax (GST) implementation
- Demonetization in 2016
- A focus on renewable energy and infrastructure

Challenges and Criticisms:
Like any leader, Modi has faced criticism over economic policy, social issues and governance decisions.

Conclusion:
Modi's tenure has been marked by ambitious reforms, digital transformation and an effort to position India as a global power.

Thank you for your attention. Are there any questions?"#;

const MODI_VIDEO: &str = r#"Hey everyone, welcome back to the channel! Today we're talking about one of the most influential leaders of our time: Narendra Modi, India's Prime Minister.

If you're new here, subscribe and hit the bell, because we dig into political leadership and world affairs every week.

So who is Narendra Modi? Born in 1950 in the small town of Vadnagar in Gujarat, he grew up helping his father sell tea at a railway station. From there to leading the world's largest democracy is quite a story.

He didn't come from a political family. He worked his way up through the RSS and the BJP, and as Chief Minister of Gujarat from 2001 to 2014 he built a reputation for running a business-friendly state.

Since 2014 as Prime Minister he's launched some huge programs. Digital India turned the country into one of the biggest digital payment markets on the planet. Swachh Bharat built over 100 million toilets. Make in India is all about manufacturing and jobs. And Ayushman Bharat covers healthcare for 500 million people.

He's also one of the first Indian leaders to really use social media, and his radio program Mann Ki Baat reaches millions.

Of course, not everything has been smooth. Demonetization was controversial, and plenty of his policies are hotly debated.

What do you think about Modi's leadership? Let me know in the comments, and if you found this useful, give it a like.

Thanks for watching, see you in the next one!"#;

const MODI_PODCAST: &str = r#"Welcome to today's episode, where we're discussing Narendra Modi, India's Prime Minister, and his impact on Indian politics and society.

I'm your host, and today we're looking at the journey of a man who went from selling tea to leading the world's largest democracy.

Born in 1950 in Vadnagar, Gujarat, Modi represents a different kind of Indian politician. He built his career from the ground up through organizational work rather than family connections.

His years as Gujarat's Chief Minister, from 2001 to 2014, were focused on economic development, infrastructure and governance reforms, and that same focus followed him to the national stage.

Digital India is a good example of how he thinks. He saw early that technology could leapfrog traditional development problems, and today India's digital payment system is among the most advanced anywhere.

Then there's the scale of programs like Swachh Bharat and Ayushman Bharat. Building over 100 million toilets, covering 500 million people with health insurance. These numbers are hard to match anywhere in the world.

His economic choices have been bold and divisive: GST, demonetization, the Make in India push. They have produced mixed results and a lot of debate.

As we wrap up, Modi clearly stands for a style of leadership built on development, technology and strong central execution, and his influence will be studied for years.

Thanks for listening. I'd love to hear what you think about his leadership style."#;

const MODI_SPEECH: &str = r#"Distinguished guests, ladies and gentlemen,

Today I speak to you about a leader who has reshaped governance in the world's largest democracy: Narendra Modi, India's Prime Minister.

Born into humble circumstances in Vadnagar, Gujarat, his rise to India's highest office reflects the democratic ideals that India stands for.

His leadership rests on three principles: development, good governance, and India's place in the world.

As Chief Minister of Gujarat for over a decade, he showed that effective administration could drive economic transformation.

Since 2014, the Digital India mission has changed how citizens reach their government. The Swachh Bharat Mission took on sanitation at a scale never attempted before. Ayushman Bharat extended healthcare coverage to 500 million people. Make in India set out to make the country a manufacturing hub.

Yet leadership is also measured by how one meets adversity. Economic headwinds, social tensions and global uncertainty have all tested his government.

Supporters and critics may disagree on particular policies, but few deny the ambition of the transformation he has attempted in a nation of 1.4 billion people.

India today is a nation confident in its abilities and ambitious about its future, and that confidence matters not only to India but to the whole world.

Thank you."#;

const MODI_TUTORIAL: &str = r#"Welcome to this overview of Narendra Modi's political career and leadership style.

Learning Objectives:
By the end of this session you will understand:
- Modi's path from grassroots organizer to Prime Minister
- The key policies of his tenure
- His leadership and communication style
- His impact on India's domestic and international standing

Section 1: Early Life
Narendra Damodardas Modi was born on September 17, 1950, in Vadnagar, Gujarat. He joined the RSS as a child and the BJP in 1987.

Section 2: Chief Minister of Gujarat (2001-2014)
- Economic development focus
- Infrastructure improvements
- Business-friendly policies

Section 3: Prime Minister (2014-present)
Digital India: digital infrastructure, literacy and services.
Swachh Bharat Mission: launched October 2, 2014; over 100 million toilets built.
Make in India: launched September 25, 2014; manufacturing across key sectors.
Ayushman Bharat: hospitalization coverage for over 500 million people.

Section 4: Leadership Style
- Heavy use of social media and the Mann Ki Baat radio address
- Technology-driven, large-scale program delivery

Section 5: Challenges
- Demonetization (2016) and GST rollout issues
- The economic impact of COVID-19

Key takeaways:
1. Clear vision needs strong execution.
2. Technology can be a powerful tool of governance.
3. Scale of implementation matters in large democracies.
4. Communication is central to political leadership.

This concludes the overview. For further study, look at the policy documents and academic analyses of his governance model."#;

// --- Topic-interpolated categories ---

const COUNTRY: &str = r#"Welcome to this exploration of {topic}.

India, officially the Republic of India, captivates the world with its diversity, culture and rapid development.

Key aspects of {topic}:

Historical Context:
India's history spans thousands of years, from ancient civilizations through colonial rule to independence in 1947, and that history shapes its modern identity.

Cultural Diversity:
With over 1.4 billion people and 22 official languages, India is unity in diversity, a great strength and a complex governance challenge.

Economic Transformation:
India has become one of the fastest-growing major economies, moving from agriculture to services and now manufacturing.

Technological Advancement:
From Bangalore's reputation as India's Silicon Valley to the digital payments revolution, technology drives modern India.

Democratic Values:
As the world's largest democracy, India's political system carries the aspirations of over a billion people.

Challenges and Opportunities:
Poverty, infrastructure and environmental sustainability remain challenges, alongside immense opportunities for growth.

This topic of {topic} is particularly relevant to understanding India's trajectory and future potential.

Thank you for exploring this subject with me."#;

const TECHNOLOGY: &str = r#"Welcome to our deep dive into {topic}.

Technology is reshaping our world at an unprecedented pace, and understanding {topic} is crucial for anyone who wants to stay relevant in today's digital landscape.

Current State:
{topic} is one of the most significant technological developments of our time, with applications from healthcare to finance and education to entertainment.

Core Concepts:
Understanding the principles behind {topic} helps us appreciate both its potential and its limits.

Real-world Applications:
Today {topic} is used to solve complex problems, automate processes and open up possibilities that were unimaginable a few years ago.

Impact on Society:
{topic} is changing how we work, learn, communicate and live.

Future Prospects:
The next decade will likely bring rapid growth in what {topic} can do.

Challenges and Considerations:
{topic} also raises hard questions about privacy, ethics, job displacement and the digital divide.

Getting Started:
There are plenty of resources for anyone who wants to start learning about {topic}.

The future belongs to those who understand and can make good use of {topic}. Keep exploring."#;

const BUSINESS: &str = r#"Welcome to our discussion on {topic}.

In a fast-moving business landscape, understanding {topic} is essential for success and growth.

Market Dynamics:
The market around {topic} is defined by rapid change, rising competition and shifting customer expectations.

Strategic Importance:
{topic} has become a critical factor in business strategy, and companies that master it gain a real advantage.

Implementation Challenges:
Getting {topic} right takes careful planning, adequate resources and committed leadership.

Best Practices:
Leading organizations have developed proven approaches to {topic} that others can learn from.

ROI and Metrics:
Measuring the success of {topic} initiatives requires clear metrics and an honest view of return on investment.

Future Trends:
The landscape around {topic} keeps evolving, and staying ahead of it is crucial.

Action Steps:
There are concrete steps any business can take today to improve in {topic}.

The businesses that thrive will be those that build {topic} into their core operations and strategy."#;

const HEALTH: &str = r#"Welcome to our discussion on {topic}.

Health and wellness are fundamental to a good life, and {topic} plays an important role in our overall well-being.

Understanding the Basics:
{topic} touches physical, mental and social well-being, and is best approached holistically.

Current Research:
Recent studies have given us new insight into {topic} and its effect on health outcomes.

Prevention and Care:
Good prevention and care strategies for {topic} can significantly improve quality of life.

Lifestyle Factors:
Diet, exercise, sleep and stress management all influence {topic}.

Medical Advances:
Modern medicine keeps making progress on {topic} with new treatments and technologies.

Public Health Perspective:
{topic} affects whole communities and calls for coordinated policy.

Personal Responsibility:
Individual choices matter a great deal for {topic}, and knowledge leads to better decisions.

When it comes to {topic}, knowledge is power, and proactive steps toward better health are always worthwhile."#;

const EDUCATION: &str = r#"Welcome to our exploration of {topic}.

Education is the foundation of personal growth and social progress, and {topic} is an important part of the learning journey.

Educational Framework:
{topic} fits within a broader educational ecosystem and connects to many learning objectives.

Learning Methodologies:
Different approaches to teaching and learning {topic} have emerged, each with its own strengths.

Student Engagement:
Keeping learners engaged with {topic} takes interactive methods and real-world connections.

Assessment and Evaluation:
Measuring progress in {topic} relies on a mix of assessment strategies.

Technology Integration:
Educational technology has changed how we approach {topic}.

Practical Applications:
Seeing how {topic} applies to real situations helps students understand why it matters.

Lifelong Learning:
{topic} is not only for the classroom; it is an area for continuous growth throughout life.

Education in {topic} empowers individuals and moves society forward."#;

const GENERIC: &str = r#"Welcome to our exploration of {topic}.

Today we're diving into a subject with real relevance in the modern world. {topic} is an area of growing importance and interest.

Understanding the Context:
To appreciate {topic}, we need to understand the context it exists in and the factors that made it significant.

Key Components:
{topic} is made up of several elements that together form the complete picture.

Current Landscape:
The present state of {topic} is shaped by trends and influences that keep changing.

Practical Implications:
Understanding {topic} has real consequences for individuals, organizations and society.

Challenges and Opportunities:
{topic} presents both challenges to address and opportunities to seize.

Different Perspectives:
Experts and stakeholders look at {topic} from different angles, each bringing useful insight.

Future Outlook:
{topic} will keep evolving, and it pays to be prepared for what comes next.

In conclusion, {topic} deserves our attention and understanding. By exploring it thoroughly we can make better-informed decisions.

Thank you for joining me in this exploration of {topic}."#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::Tone;

    fn request(topic: &str, format: ScriptFormat) -> ScriptRequest {
        ScriptRequest {
            topic: topic.to_string(),
            format,
            duration: 5,
            tone: Tone::Professional,
            audience: String::new(),
        }
    }

    #[test]
    fn test_classify_examples() {
        assert_eq!(classify("Modi's tea stall story"), Category::PublicFigure);
        assert_eq!(classify("quantum computing advances"), Category::Technology);
        assert_eq!(classify("my grandmother's garden"), Category::Generic);
        assert_eq!(classify("Delhi street food"), Category::Country);
        assert_eq!(classify("startup funding"), Category::Business);
        assert_eq!(classify("Fitness after forty"), Category::Health);
        assert_eq!(classify("University admissions"), Category::Education);
        assert_eq!(classify(""), Category::Generic);
    }

    #[test]
    fn test_first_match_wins() {
        // Matches the public figure, country and technology keyword sets.
        assert_eq!(
            classify("PM Modi and Digital India"),
            Category::PublicFigure
        );
        // Country before technology.
        assert_eq!(classify("Bangalore tech scene"), Category::Country);
        // Technology before business ("digital" and "marketing").
        assert_eq!(classify("Digital Marketing"), Category::Technology);
        // Business before health.
        assert_eq!(classify("Healthcare startup economy"), Category::Business);
    }

    #[test]
    fn test_public_figure_ignores_topic_wording() {
        for format in ScriptFormat::ALL {
            let a = select_content(&request("Modi", format));
            let b = select_content(&request("The life of PM Modi", format));
            assert_eq!(a, b);
            assert!(!a.contains(TOPIC_PLACEHOLDER));
        }
        let video = select_content(&request("modi", ScriptFormat::Video));
        let podcast = select_content(&request("modi", ScriptFormat::Podcast));
        assert_ne!(video, podcast);
    }

    #[test]
    fn test_interpolated_categories_fall_back_to_single_template() {
        let presentation = select_content(&request("Blockchain", ScriptFormat::Presentation));
        let tutorial = select_content(&request("Blockchain", ScriptFormat::Tutorial));
        assert_eq!(presentation, tutorial);
        assert!(presentation.starts_with("Welcome to our deep dive into Blockchain."));
        assert!(!presentation.contains(TOPIC_PLACEHOLDER));
    }

    #[test]
    fn test_topic_is_substituted_verbatim() {
        let content = select_content(&request("My Grandmother's Garden", ScriptFormat::Speech));
        assert!(content.starts_with("Welcome to our exploration of My Grandmother's Garden."));
        assert!(content.ends_with("exploration of My Grandmother's Garden."));
    }

    #[test]
    fn test_every_category_and_format_is_non_empty() {
        let topics = [
            "modi",
            "india",
            "software",
            "finance",
            "medicine",
            "school",
            "origami",
            "",
        ];
        for topic in topics {
            for format in ScriptFormat::ALL {
                let content = select_content(&request(topic, format));
                assert!(!content.trim().is_empty(), "{topic} / {format:?}");
            }
        }
    }
}
