//! Built-in curriculum so the server is useful without a data file.

use crate::domain::{
  CodeExample, Curriculum, Difficulty, Language, Problem, Solution, SnippetKind, TestCase, TopicMeta, TopicRecord,
};

fn tc(input: &str, expected: &str, hidden: bool) -> TestCase {
  TestCase { input: input.into(), expected_output: expected.into(), hidden }
}

/// Minimal curriculum: one topic, two problems with solutions in a few languages.
pub fn seed_curriculum() -> Curriculum {
  Curriculum {
    topics: vec![TopicRecord {
      topic: TopicMeta {
        slug: "arrays-and-hashing".into(),
        title: "Arrays & Hashing".into(),
        description: "Index tricks, prefix sums and hash maps: the toolkit behind most array problems.".into(),
        order: Some(1),
      },
      code_examples: vec![CodeExample {
        title: "Counting with a hash map".into(),
        description: "Build a frequency table in one pass.".into(),
        language: Some(Language::Python),
        code: "from collections import Counter\n\ncounts = Counter([1, 2, 2, 3])\nprint(counts[2])  # 2".into(),
      }],
      problems: vec![
        Problem {
          id: None,
          title: "Two Sum".into(),
          description: "Given an array of integers `nums` and an integer `target`, return the indices of the two numbers that add up to `target`.\n\nEach input has exactly one solution and you may not use the same element twice.".into(),
          difficulty: Difficulty::Easy,
          test_cases: vec![
            tc("nums = [2, 7, 11, 15], target = 9", "[0, 1]", false),
            tc("nums = [3, 2, 4]\ntarget = 6", "[1, 2]", false),
            tc("nums = [3, 3], target = 6", "[0, 1]", true),
          ],
          solutions: vec![
            Solution {
              language: Language::Python,
              code: "class Solution:\n    def twoSum(self, nums, target):\n        seen = {}\n        for i, x in enumerate(nums):\n            if target - x in seen:\n                return [seen[target - x], i]\n            seen[x] = i\n        return []".into(),
              kind: SnippetKind::Solution,
            },
            Solution {
              language: Language::Cpp,
              code: "class Solution {\npublic:\n    vector<int> twoSum(vector<int>& nums, int target) {\n        unordered_map<int, int> seen;\n        for (int i = 0; i < (int)nums.size(); i++) {\n            auto it = seen.find(target - nums[i]);\n            if (it != seen.end()) return {it->second, i};\n            seen[nums[i]] = i;\n        }\n        return {};\n    }\n};".into(),
              kind: SnippetKind::Solution,
            },
          ],
          concept_explanation: "Store each value's index in a hash map. For every element `x`, check whether `target - x` was already seen: that turns the O(n^2) pair search into a single O(n) pass.".into(),
          worked_example: "For `nums = [2, 7, 11, 15]` and `target = 9`:\n\n| i | x | need | seen |\n|---|---|------|------|\n| 0 | 2 | 7 | {} |\n| 1 | 7 | 2 | {2: 0} |\n\nAt `i = 1` the complement `2` is in `seen`, so the answer is `[0, 1]`.".into(),
          submission_format: "C++: `vector<int> twoSum(vector<int>& nums, int target)`\nPython: `def twoSum(self, nums: List[int], target: int) -> List[int]:`\nJava: `public int[] twoSum(int[] nums, int target)`\nJavaScript: `var twoSum = function(nums, target)`\nC: `int* twoSum(int* nums, int numsSize, int target, int* returnSize)`".into(),
        },
        Problem {
          id: None,
          title: "Running Sum".into(),
          description: "Return the running sum of `nums`, where `runningSum[i] = sum(nums[0..=i])`.".into(),
          difficulty: Difficulty::Easy,
          test_cases: vec![tc("[1, 2, 3, 4]", "[1, 3, 6, 10]", false), tc("[3, 1, 2, 10, 1]", "[3, 4, 6, 16, 17]", true)],
          solutions: vec![Solution {
            language: Language::Javascript,
            code: "var runningSum = function(nums) {\n    let acc = 0;\n    return nums.map((x) => (acc += x));\n};".into(),
            kind: SnippetKind::Solution,
          }],
          concept_explanation: "Carry an accumulator through a single pass.".into(),
          worked_example: String::new(),
          submission_format: "Python: `def runningSum(self, nums: List[int]) -> List[int]:`\nJavaScript: `var runningSum = function(nums)`".into(),
        },
      ],
    }],
  }
}
