//! The instruction template wrapped around retrieved passages.

/// Persona preamble of the network-planning assistant.
const NETWORK_PLANNING_PERSONA: &str = "\
You are an advanced AI assistant with expertise in 5G network optimization, deployment strategies \
and resource allocation. Your role is to analyze network datasets to identify inefficiencies, \
propose actionable deployment and optimization strategies, and quantify potential improvements.";

const NETWORK_PLANNING_DATA: &str = "\
The following documents contain detailed information about 5G network deployment, resource \
utilization and operational metrics:";

const NETWORK_PLANNING_INSTRUCTIONS: &str = "\
1. **Highlight Areas of Network Inefficiencies**:
   - Identify inefficiencies such as underutilized network nodes, high latency areas or imbalanced \
resource allocation.
   - Back every observation with data points from the documents.

2. **Suggest Strategies for Network Optimization**:
   - Recommend actionable steps such as adjusting network configurations, deploying additional \
nodes or reallocating bandwidth.
   - Keep suggestions feasible and aligned with the provided datasets.

3. **Quantify Cost-Saving and Performance Benefits**:
   - Estimate the cost savings of the suggested strategies.
   - Highlight performance benefits such as improved latency, higher throughput or better user \
experience.

4. **Present the Response Clearly**:
   - Organize the findings step by step.
   - Use tables, bullet points or concise paragraphs.";

const NETWORK_PLANNING_OUTPUT_FORMAT: &str = "\
- **Network Inefficiencies Identified**:
  1. ...
  2. ...

- **Optimization Strategies**:
  1. ...
  2. ...

- **Cost-Saving and Performance Benefits**:
  - Cost Savings: $...
  - Performance Improvements: ...";

const NETWORK_PLANNING_CLOSING: &str =
    "Please ensure the response is data-driven, actionable, and easy to understand.";

/// A prompt made of fixed sections around the retrieved documents and the
/// user's question.
///
/// Rendered layout:
///
/// ```text
/// {persona}
///
/// ### Data Provided:
/// {data_description}
/// Document 1:
/// ...
///
/// ### Question:
/// {question}
///
/// ### Instructions:
/// {instructions}
///
/// ### Example Output Format:
/// {output_format}
///
/// {closing}
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    pub persona: String,
    pub data_description: String,
    pub instructions: String,
    pub output_format: String,
    pub closing: String,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::network_planning()
    }
}

impl PromptTemplate {
    /// The 5G network-planning analyst template.
    pub fn network_planning() -> Self {
        Self {
            persona: NETWORK_PLANNING_PERSONA.to_string(),
            data_description: NETWORK_PLANNING_DATA.to_string(),
            instructions: NETWORK_PLANNING_INSTRUCTIONS.to_string(),
            output_format: NETWORK_PLANNING_OUTPUT_FORMAT.to_string(),
            closing: NETWORK_PLANNING_CLOSING.to_string(),
        }
    }

    /// Render the prompt. Each document is trimmed and numbered from 1;
    /// the question is inserted verbatim.
    pub fn render(&self, question: &str, documents: &[&str]) -> String {
        let context = documents
            .iter()
            .enumerate()
            .map(|(i, doc)| format!("Document {}:\n{}", i + 1, doc.trim()))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "{persona}\n\n\
             ### Data Provided:\n{data}\n{context}\n\n\
             ### Question:\n{question}\n\n\
             ### Instructions:\n{instructions}\n\n\
             ### Example Output Format:\n{format}\n\n\
             {closing}",
            persona = self.persona,
            data = self.data_description,
            instructions = self.instructions,
            format = self.output_format,
            closing = self.closing,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_and_trims_documents() {
        let prompt = PromptTemplate::default().render("Where is latency high?", &["  a  ", "b\n"]);
        assert!(prompt.contains("Document 1:\na\nDocument 2:\nb\n"));
        assert!(prompt.contains("### Question:\nWhere is latency high?\n"));
    }

    #[test]
    fn contains_the_four_instruction_blocks_in_order() {
        let prompt = PromptTemplate::network_planning().render("q", &["d"]);
        let positions: Vec<usize> = [
            "Highlight Areas of Network Inefficiencies",
            "Suggest Strategies for Network Optimization",
            "Quantify Cost-Saving and Performance Benefits",
            "Present the Response Clearly",
            "### Example Output Format:",
        ]
        .iter()
        .map(|heading| prompt.find(heading).unwrap())
        .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(prompt.starts_with("You are an advanced AI assistant"));
    }
}
