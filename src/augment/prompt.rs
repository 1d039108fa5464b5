// src/augment/prompt.rs
//! Prompt assembly: serialize the candidate block into a single instruction
//! that pins the output to a `results` JSON object. The visual-style rules
//! are a rendering concern for the generation service; the pipeline only
//! validates the JSON shape afterwards.

use crate::aggregator::types::Candidate;
use crate::augment::merge::format_date;

const PROMPT_EXCERPT_CHARS: usize = 300;

/// Build the combined prompt for one candidate batch.
/// `today` is the ISO date used to anchor "recent" in the instruction.
pub fn build_prompt(candidates: &[Candidate], today: &str) -> String {
    let mut block = String::new();
    for c in candidates {
        let excerpt: String = c.item.excerpt.chars().take(PROMPT_EXCERPT_CHARS).collect();
        block.push_str(&format!(
            "[{index}] title: {title}\n    source: {source}\n    url: {url}\n    published: {date}\n    excerpt: {excerpt}\n",
            index = c.index,
            title = c.item.title,
            source = c.item.source_name,
            url = c.item.link,
            date = format_date(c.item.published_at),
            excerpt = excerpt,
        ));
    }

    format!(
        r#"あなたは最新AI技術に精通したテクノロジージャーナリストです。
今日は{today}です。

以下は過去48時間以内に公開されたAI関連ニュース記事のリストです：

{block}
【任務】
各記事について、要約と図解HTMLを作成してください。

【要約の条件】
- 日本語で250〜350文字
- 何が発表されたか、なぜ重要か、誰に影響があるか、今後どうなるかを含むこと

【translatedTitleの条件】
- 記事タイトルの自然な日本語訳（元が日本語の場合は省略可）

【図解（visualHtml）の設計原則】
図解とは「空間配置と視覚要素で情報の関係性を一目で理解させる」ものです。
1. 空間配置: 左→右で時間の流れ、上→下で階層
2. 接続表現: 矢印（→、↓）で因果関係やフローを示す
3. 囲み/グループ化: 関連要素をボックスで囲む
4. 色の意味: 青=入力/開始、緑=処理/成功、赤=出力/注意、黄=ポイント
5. サイズの強弱: 重要なものは大きく、補足は小さく
Tailwindのユーティリティクラス（bg-*, border-*, rounded-*, grid, flex など）を
使った自己完結の<div>フラグメントとして出力してください。

【出力形式】
以下のJSONオブジェクトのみを出力してください。説明文は不要です：

{{
  "results": [
    {{
      "index": 1,
      "summary": "記事の要約（日本語、250〜350文字）",
      "translatedTitle": "日本語タイトル",
      "visualHtml": "<div class=\"...\">...</div>"
    }}
  ]
}}

indexは上記リストの番号と一致させてください。
"#
    )
}
