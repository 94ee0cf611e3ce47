//! Instruction text sent to the generation backends.

use crate::llm::Message;
use crate::results::Page;
use serde::{Deserialize, Serialize};

pub const SUMMARY_SYSTEM_PROMPT: &str = "You are an assistant that analyzes the contents of a website \
and provides a short summary, ignoring text that might be navigation related. \
Respond in markdown.";

pub const LINK_SYSTEM_PROMPT: &str = "You are provided with a list of links found on a webpage. \
You are able to decide which of the links would be most relevant to include in a brochure about the company, \
such as links to an About page, or a Company page, or Careers/Jobs pages.
You should respond in JSON as in this example:
{
    \"links\": [
        {\"type\": \"about page\", \"url\": \"https://full.url/goes/here/about\"},
        {\"type\": \"careers page\", \"url\": \"https://another.full.url/careers\"}
    ]
}
";

const BROCHURE_SYSTEM_PROMPT: &str = "You are an assistant that analyzes the contents of several relevant pages from a company website \
and creates a short brochure about the company for prospective customers, investors and recruits. Respond in markdown. \
Include details of company culture, customers and careers/jobs if you have the information.";

const HUMOROUS_BROCHURE_SYSTEM_PROMPT: &str = "You are an assistant that analyzes the contents of several relevant pages from a company website \
and creates a short humorous, entertaining, jokey brochure about the company for prospective customers, investors and recruits. \
Respond in markdown. Include details of company culture, customers and careers/jobs if you have the information.";

/// Voice of the generated brochure
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    #[default]
    Professional,
    Humorous,
}

impl Tone {
    pub fn brochure_system_prompt(&self) -> &'static str {
        match self {
            Tone::Professional => BROCHURE_SYSTEM_PROMPT,
            Tone::Humorous => HUMOROUS_BROCHURE_SYSTEM_PROMPT,
        }
    }
}

pub fn summary_user_prompt(page: &Page) -> String {
    let mut prompt = format!("You are looking at a website titled {}.\n", page.title);
    prompt.push_str(
        "The contents of this website is as follows; please provide a short summary of this website in markdown. \
If it includes news or announcements, then summarize these too.\n\n",
    );
    prompt.push_str(&page.body_text);
    prompt
}

pub fn summary_messages(page: &Page) -> Vec<Message> {
    vec![
        Message::system(SUMMARY_SYSTEM_PROMPT),
        Message::user(summary_user_prompt(page)),
    ]
}

/// Raw link list with the instructions for picking brochure-worthy ones
pub fn links_user_prompt(page: &Page) -> String {
    let mut prompt = format!(
        "Here is the list of links on the website of {} - ",
        page.url
    );
    prompt.push_str(
        "please decide which of these are relevant web links for a brochure about the company, \
respond with the full https URL in JSON format. \
Do not include Terms of Service, Privacy, email links.\n",
    );
    prompt.push_str("Links (some might be relative links):\n");
    prompt.push_str(&page.links.join("\n"));
    prompt
}

pub fn links_messages(page: &Page) -> Vec<Message> {
    vec![
        Message::system(LINK_SYSTEM_PROMPT),
        Message::user(links_user_prompt(page)),
    ]
}

/// Header naming the company, followed by the assembled document
pub fn brochure_user_prompt(company_name: &str, document: &str) -> String {
    let mut prompt = format!("You are looking at a company called: {}\n", company_name);
    prompt.push_str(
        "Here are the contents of its landing page and other relevant pages; \
use this information to build a short brochure of the company in markdown.\n",
    );
    prompt.push_str(document);
    prompt
}

pub fn brochure_messages(tone: Tone, company_name: &str, document: &str) -> Vec<Message> {
    vec![
        Message::system(tone.brochure_system_prompt()),
        Message::user(brochure_user_prompt(company_name, document)),
    ]
}
