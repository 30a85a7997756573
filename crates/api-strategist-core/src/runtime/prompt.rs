// crates/api-strategist-core/src/runtime/prompt.rs
// ============================================================================
// Module: Strategy Prompt Composition
// Description: Builds the structured prompt sent to the language model.
// Purpose: Expose the full function catalog and the analysis framework to the model.
// Dependencies: crate::runtime::catalog
// ============================================================================

//! ## Overview
//! The prompt has four parts: a role preamble, the available functions
//! grouped by resource area (generated from the catalog so the model always
//! sees exactly what it can call), a fixed analysis framework with a response
//! format template, and the operator's instructions inside a delimited
//! section. Instructions are interpolated verbatim.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Write;

use crate::interfaces::FunctionDescriptor;
use crate::runtime::catalog::FunctionCatalog;

// ============================================================================
// SECTION: Fixed Sections
// ============================================================================

/// Heading that opens the user instructions section.
pub const INSTRUCTIONS_HEADING: &str = "## User Instructions";

/// Role preamble.
const PREAMBLE: &str = "\
# API Test Execution Strategy Analyzer

You are an expert API test automation strategist. Your role is to analyze user \
requirements, determine the optimal set of API tests to execute, and invoke them.
";

/// Analysis framework and response format template.
const ANALYSIS_FRAMEWORK: &str = "\
## Analysis Framework

### 1. Requirement Analysis
- Parse the user instructions to identify:
  - **Scope**: Which API endpoints are relevant?
  - **Test Types**: CRUD operations, error scenarios, authentication?
  - **Priority**: Critical vs. nice-to-have tests
  - **Dependencies**: Which tests should run in sequence?

### 2. Test Selection Strategy
- **Comprehensive Coverage**: For broad requirements, include all relevant tests
- **Targeted Testing**: For specific scenarios, focus on relevant functions
- **Error Scenarios**: Include negative test cases when appropriate
- **Authentication Flow**: Include login tests when user operations are involved

### 3. Execution Sequence
- **Foundation First**: Authentication and basic GET operations
- **Core Functionality**: Primary business operations
- **Edge Cases**: Error handling and boundary conditions
- **Integration**: Cross-functional scenarios

## Response Format

Provide your analysis in this structured format:

```
## Test Strategy Analysis

### Requirements Summary
[Brief summary of what the user wants to test]

### Recommended Test Functions
1. **[Test Function Name]**
   - **Purpose**: [Why this test is needed]
   - **Priority**: [High/Medium/Low]
   - **Dependencies**: [Any prerequisite tests]

### Execution Sequence
1. [First test to run]
2. [Second test to run]

### Expected Outcomes
- [What successful execution should demonstrate]
- [Potential failure scenarios to watch for]

### Risk Assessment
- [Potential issues or limitations]
- [Mitigation strategies]
```
";

/// Closing request that asks the model to act.
const ANALYSIS_REQUEST: &str = "\
## Analysis Request
Based on the user instructions above, analyze the requirements and invoke the required tools.
";

// ============================================================================
// SECTION: Prompt
// ============================================================================

/// Composed strategy prompt.
///
/// # Invariants
/// - Every catalog function appears exactly once in the functions section.
/// - The instructions appear verbatim after [`INSTRUCTIONS_HEADING`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyPrompt {
    /// Full prompt text.
    text: String,
    /// Number of functions listed.
    function_count: usize,
    /// Number of resource areas listed.
    area_count: usize,
}

impl StrategyPrompt {
    /// Composes the prompt for `instructions` against `catalog`.
    #[must_use]
    pub fn compose(catalog: &FunctionCatalog, instructions: &str) -> Self {
        let areas = group_by_area(catalog.descriptors());
        let mut text = String::with_capacity(4096 + instructions.len());
        text.push_str(PREAMBLE);
        text.push_str("\n## Available API Test Functions\n");
        text.push_str("You have access to the following API test functions:\n");
        for (area, functions) in &areas {
            let _ = write!(text, "\n### {area}\n");
            for descriptor in functions {
                let _ = writeln!(text, "- `{}`: {}", descriptor.name, descriptor.description);
            }
        }
        text.push('\n');
        text.push_str(ANALYSIS_FRAMEWORK);
        text.push('\n');
        text.push_str(INSTRUCTIONS_HEADING);
        text.push('\n');
        text.push_str(instructions);
        text.push_str("\n\n");
        text.push_str(ANALYSIS_REQUEST);
        Self {
            text,
            function_count: areas.iter().map(|(_, functions)| functions.len()).sum(),
            area_count: areas.len(),
        }
    }

    /// Returns the prompt text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Returns the number of functions listed.
    #[must_use]
    pub const fn function_count(&self) -> usize {
        self.function_count
    }

    /// Returns the number of resource areas listed.
    #[must_use]
    pub const fn area_count(&self) -> usize {
        self.area_count
    }
}

/// Groups descriptors by area, keeping first-seen order for areas and functions.
fn group_by_area<'a>(
    descriptors: impl Iterator<Item = &'a FunctionDescriptor>,
) -> Vec<(&'a str, Vec<&'a FunctionDescriptor>)> {
    let mut areas: Vec<(&str, Vec<&FunctionDescriptor>)> = Vec::new();
    for descriptor in descriptors {
        let area = descriptor.area.trim();
        let area = if area.is_empty() { "General" } else { area };
        if let Some((_, functions)) = areas.iter_mut().find(|(name, _)| *name == area) {
            functions.push(descriptor);
        } else {
            areas.push((area, vec![descriptor]));
        }
    }
    areas
}
