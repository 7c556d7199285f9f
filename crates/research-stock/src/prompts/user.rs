//! Per-run prompts for the research analysts

use super::system::{FUNDAMENTALIST, QUANT, STRATEGIST};
use crate::error::Result;
use minijinja::{Environment, context};

const PEER_DISCOVERY_TEMPLATE: &str = r"You are a financial analyst. Given the stock ticker '{{ ticker }}',
return ONLY a list of exactly 3 competitor ticker symbols.
Return ONLY the list, nothing else. Format: ['TICKER1', 'TICKER2', 'TICKER3']

Example for AAPL: ['MSFT', 'GOOGL', 'META']

Now provide 3 competitors for {{ ticker }}:";

const FUNDAMENTAL_TEMPLATE: &str = r"{{ persona }}

Here is the market data for {{ ticker }}:

{{ market_data }}

Provide your fundamental analysis:";

const QUANT_TEMPLATE: &str = r"{{ persona }}

Here is the peer comparison data for {{ ticker }}:

{{ market_data }}

Provide your quantitative analysis:";

const SYNTHESIS_TEMPLATE: &str = r"{{ persona }}

You are analyzing: {{ ticker }}

=== FUNDAMENTAL ANALYST'S REPORT ===
{{ fundamental_analysis }}

=== QUANTITATIVE ANALYST'S REPORT ===
{{ quant_analysis }}

=== YOUR TASK ===
Synthesize the above analyses into a final investment memo with a clear BUY/SELL/HOLD recommendation.";

fn render(template: &str, ctx: minijinja::Value) -> Result<String> {
    let env = Environment::new();
    Ok(env.render_str(template, ctx)?)
}

/// Ask for exactly three competitor tickers as a literal list
pub fn peer_discovery_prompt(ticker: &str) -> Result<String> {
    render(PEER_DISCOVERY_TEMPLATE, context! { ticker })
}

/// Fundamentalist persona followed by the market data report
pub fn fundamental_prompt(ticker: &str, market_data: &str) -> Result<String> {
    render(
        FUNDAMENTAL_TEMPLATE,
        context! { persona => FUNDAMENTALIST, ticker, market_data },
    )
}

/// Quant persona followed by the peer comparison report
pub fn quant_prompt(ticker: &str, market_data: &str) -> Result<String> {
    render(
        QUANT_TEMPLATE,
        context! { persona => QUANT, ticker, market_data },
    )
}

/// Strategist persona embedding both analyst reports
pub fn synthesis_prompt(
    ticker: &str,
    fundamental_analysis: &str,
    quant_analysis: &str,
) -> Result<String> {
    render(
        SYNTHESIS_TEMPLATE,
        context! { persona => STRATEGIST, ticker, fundamental_analysis, quant_analysis },
    )
}
